#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReference {
    pub name: String,
    pub path: Option<String>,
}
