use crate::config::{get_config_path, Config};
use crate::constants::Message;
use crate::external_api::ApiError;
use std::io::{BufRead, Write};
use std::path::Path;

/// Ask for the config values and write them to `path`
pub fn init_config_at<R, W>(path: &Path, input: R, mut output: W) -> Result<String, ApiError>
where
    R: BufRead,
    W: Write,
{
    let config = Config::create(input, &mut output)?;
    config.save(path)?;
    Ok(Message::ConfigSaved(path.display().to_string()).to_formatted_string())
}

/// Create the config file in the default location
pub fn init_config<R, W>(input: R, output: W) -> Result<String, ApiError>
where
    R: BufRead,
    W: Write,
{
    init_config_at(&get_config_path()?, input, output)
}
