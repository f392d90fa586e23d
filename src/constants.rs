pub const CONFIG_DIR: &str = ".config/kitfields";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_API_BASE_URL: &str = "https://api.convertkit.com/v3";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const ENV_API_SECRET: &str = "CONVERTKIT_API_SECRET";
pub const ENV_API_URL: &str = "CONVERTKIT_API_URL";
pub const ENTER_API_BASE_URL: &str = "Enter the ConvertKit API url (empty for default): ";
pub const ENTER_API_SECRET: &str = "Enter the ConvertKit API secret: ";

/// Standard message
#[derive(Debug)]
pub enum Message {
    ConfigSaved(String),
    NoCustomFields,
    FieldsFound(usize),
    FieldLine(String, String, u64),
    FieldCreated(String),
    ApproveDeleteField(String),
}

impl Message {
    pub fn to_formatted_string(&self) -> String {
        match self {
            Message::ConfigSaved(path) => format!(
                "Config saved to {}. To view the available commands, type: kitfields --help",
                path
            ),
            Message::NoCustomFields => "No custom fields found".to_string(),
            Message::FieldsFound(count) => format!("Found {} custom field(s):", count),
            Message::FieldLine(label, key, id) => format!("- {} (key: {}, id: {})", label, key, id),
            Message::FieldCreated(label) => format!("Created custom field '{}'", label),
            Message::ApproveDeleteField(label) => {
                format!("You want to delete the custom field '{}' [y/n]? ", label)
            }
        }
    }
}
