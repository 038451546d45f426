use crate::domain::model::Sheet;
use crate::utils::error::Result;
use std::path::Path;

/// Row Source：把試算表檔案讀成每張工作表的 FlatRecord 序列
pub trait RowSource {
    /// 解析檔案；`sheet_name` 為 None 時讀取全部工作表
    fn parse(&self, path: &Path, sheet_name: Option<&str>) -> Result<Vec<Sheet>>;
}
