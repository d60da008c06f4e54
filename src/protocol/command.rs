#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    SplitText,
    FillGaps,
    ExtractMenu,
    BuildRows,
    ExportMenu,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "split_text" => Command::SplitText,
            "fill_gaps" => Command::FillGaps,
            "extract_menu" => Command::ExtractMenu,
            "build_rows" => Command::BuildRows,
            "export_menu" => Command::ExportMenu,
            _ => Command::Unknown,
        }
    }
}
