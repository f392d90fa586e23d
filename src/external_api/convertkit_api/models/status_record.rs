/// Normalized result of update and delete, which have no response body
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub status: u16,
    pub message: String,
    pub success: bool,
}

impl StatusRecord {
    pub fn success(status: u16, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            success: true,
        }
    }
}
