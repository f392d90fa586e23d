use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};

use crate::command_logic::custom_fields::{
    create_fields, delete_field, list_fields, run_action_by_name, update_field,
};
use crate::external_api::{convertkit_api::ConvertkitApi, ApiError, Transport};

#[derive(Parser)]
#[command(
    name = "kitfields",
    version,
    about = "Manage ConvertKit custom fields from the command line",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file
    Init,
    /// List all custom fields
    List,
    /// Create custom fields
    Create(CreateArgs),
    /// Rename a custom field
    Update(UpdateArgs),
    /// Delete a custom field
    Delete(DeleteArgs),
    /// Run an action by name with JSON properties
    Run(RunArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Label of the new field, repeat to create several
    #[arg(long = "label", short, required = true, value_parser = validate_label)]
    pub labels: Vec<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Current label of the field
    #[arg(long, short, required = true, value_parser = validate_label)]
    pub label: String,
    /// New label for the field
    #[arg(long, short, required = true, value_parser = validate_label)]
    pub new_label: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Label of the field
    #[arg(long, short, required = true, value_parser = validate_label)]
    pub label: String,
    /// Do not ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Action name, e.g. custom_fields_list_fields
    pub action: String,
    /// Action properties as a JSON object
    #[arg(long, short)]
    pub props: Option<String>,
}

fn validate_label(value: &str) -> Result<String, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::EmptyLabel("label"));
    }
    Ok(value.to_string())
}

pub async fn handle_command<T, R, W>(
    command: &Commands,
    api: &ConvertkitApi<T>,
    input: R,
    output: W,
) -> Result<String, ApiError>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    match command {
        // runs in `main` before the config is loaded
        Commands::Init => unreachable!("init is handled before the API client is built"),
        Commands::List => list_fields(api).await,
        Commands::Create(value) => create_fields(api, &value.labels).await,
        Commands::Update(value) => update_field(api, &value.label, &value.new_label).await,
        Commands::Delete(value) => delete_field(api, &value.label, value.yes, input, output).await,
        Commands::Run(value) => {
            run_action_by_name(api, &value.action, value.props.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use clap::Parser;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case("-l")]
    #[case("--label")]
    fn test_create_command_positive(#[case] flag: String) {
        let args = Cli::parse_from(["kitfields", "create", &flag, "Age", &flag, "City"]);
        match args.command {
            Commands::Create(value) => assert_eq!(value.labels, vec!["Age", "City"]),
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn test_update_command_positive() {
        let args = Cli::parse_from([
            "kitfields",
            "update",
            "-l",
            "Age",
            "--new-label",
            "Age Group",
        ]);
        match args.command {
            Commands::Update(value) => {
                assert_eq!(value.label, "Age");
                assert_eq!(value.new_label, "Age Group");
            }
            _ => panic!("expected update command"),
        }
    }

    #[rstest]
    #[case(&["kitfields", "delete", "-l", "Age"], false)]
    #[case(&["kitfields", "delete", "-l", "Age", "-y"], true)]
    #[case(&["kitfields", "delete", "--yes", "--label", "Age"], true)]
    fn test_delete_command_positive(#[case] argv: &[&str], #[case] exp_yes: bool) {
        let args = Cli::parse_from(argv);
        match args.command {
            Commands::Delete(value) => {
                assert_eq!(value.label, "Age");
                assert_eq!(value.yes, exp_yes);
            }
            _ => panic!("expected delete command"),
        }
    }

    #[test]
    fn test_run_command_positive() {
        let args = Cli::parse_from([
            "kitfields",
            "-v",
            "run",
            "custom_fields_delete_field",
            "-p",
            r#"{"label":"Age"}"#,
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Run(value) => {
                assert_eq!(value.action, "custom_fields_delete_field");
                assert_eq!(value.props.as_deref(), Some(r#"{"label":"Age"}"#));
            }
            _ => panic!("expected run command"),
        }
    }

    #[rstest]
    #[case(&["kitfields", "create", "-l", ""])]
    #[case(&["kitfields", "create", "-l", "  "])]
    #[case(&["kitfields", "update", "-l", "Age", "-n", ""])]
    #[case(&["kitfields", "delete", "-l", ""])]
    #[case(&["kitfields", "create"])]
    #[case(&["kitfields", "update", "-l", "Age"])]
    fn test_invalid_arguments(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_validate_label() {
        assert_eq!(validate_label("Age").unwrap(), "Age");
        assert!(matches!(validate_label(""), Err(ApiError::EmptyLabel("label"))));
    }

    #[tokio::test]
    #[should_panic(expected = "init is handled before the API client is built")]
    async fn test_handle_init_command_is_not_dispatched() {
        let api = ConvertkitApi::mock("http://127.0.0.1:9");
        let _ = handle_command(
            &Commands::Init,
            &api,
            Cursor::new(Vec::<u8>::new()),
            Cursor::new(Vec::<u8>::new()),
        )
        .await;
    }

    #[tokio::test]
    async fn test_handle_update_command() {
        let mut server = mockito::Server::new_async().await;
        let mock = ConvertkitApi::mock_update_field(&mut server, "Age", "Age Group", 204).await;
        let api = ConvertkitApi::mock(&server.url());

        let cli = Cli::parse_from(["kitfields", "update", "-l", "Age", "-n", "Age Group"]);
        let result = handle_command(
            &cli.command,
            &api,
            Cursor::new(Vec::<u8>::new()),
            Cursor::new(Vec::<u8>::new()),
        )
        .await;

        assert_eq!(result.unwrap(), "Field updated");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_handle_delete_command_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = ConvertkitApi::mock_delete_field(&mut server, "Age", 500).await;
        let api = ConvertkitApi::mock(&server.url());

        let cli = Cli::parse_from(["kitfields", "delete", "-l", "Age", "-y"]);
        let err = handle_command(
            &cli.command,
            &api,
            Cursor::new(Vec::<u8>::new()),
            Cursor::new(Vec::<u8>::new()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Error deleting field: 500");
    }
}
