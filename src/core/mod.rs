pub mod api_transformer;
pub mod curl_generator;
pub mod engine;
pub mod field_mapper;
pub mod json_converter;

pub use crate::domain::model::{
    ApiEnvelope, BasicAuth, BatchingMode, CallSpec, CellValue, Document, FieldEntry, FlatRecord,
    MappedRecord, Sheet, UnmappedPolicy,
};
pub use crate::domain::ports::RowSource;
pub use crate::utils::error::Result;
