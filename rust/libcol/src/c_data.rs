/// A declaration/definition pair destined for a `.h` and a `.c` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CData {
    pub header: String,
    pub source: String,
}

impl CData {
    pub fn new() -> CData {
        CData::default()
    }

    /// Concatenates header onto header and source onto source.
    pub fn append(&mut self, other: &CData) {
        self.header.push_str(&other.header);
        self.source.push_str(&other.source);
    }
}
