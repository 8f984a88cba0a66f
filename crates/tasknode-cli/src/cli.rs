use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tasknode",
    version,
    about = "TaskNode CLI - Run your Python scripts in the cloud",
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a Python script to be run in the cloud
    Submit {
        /// The Python script to run, relative to the current directory
        /// (for example 'script.py' or 'path/to/script.py')
        script: String,
    },
    /// Log in to your TaskNode account
    Login,
    /// Sign up for a TaskNode account
    Signup,
    /// Log out of your TaskNode account
    Logout,
    /// Show the available commands
    Help,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from(["tasknode", "submit", "jobs/train.py"]).unwrap();
        match cli.command {
            Command::Submit { script } => assert_eq!(script, "jobs/train.py"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_submit_requires_script() {
        assert!(Cli::try_parse_from(["tasknode", "submit"]).is_err());
    }

    #[test]
    fn test_help_is_a_command() {
        let cli = Cli::try_parse_from(["tasknode", "help"]).unwrap();
        assert!(matches!(cli.command, Command::Help));
    }
}
