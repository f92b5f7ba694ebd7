//! User-visible message text shared by the pipeline and its tests.

pub const MISSING_NORMALIZE_SEVERITY: &str =
    "Missing required --normalize-severity flag from run-arguments input.";
pub const SF_CLI_NOT_INSTALLED: &str =
    "The Salesforce CLI is not installed. Installing it now.";
pub const SF_CLI_INSTALL_FAILED: &str = "Failed to install the Salesforce CLI.";
pub const MINIMUM_SCANNER_PLUGIN_NOT_INSTALLED: &str = "The minimum required version of the Salesforce Code Analyzer plugin is not installed. Installing the latest version now.";
pub const SCANNER_PLUGIN_INSTALL_FAILED: &str =
    "Failed to install the latest version of the Salesforce Code Analyzer plugin.";

pub mod step_labels {
    pub const PREPARING_ENVIRONMENT: &str = "Preparing Environment";
    pub const RUNNING_CODE_ANALYZER: &str = "Running Salesforce Code Analyzer";
    pub const UPLOADING_ARTIFACT: &str = "Uploading Artifact";
    pub const ANALYZING_RESULTS: &str = "Analyzing Results";
    pub const CREATING_SUMMARY: &str = "Creating Summary";
}

pub fn file_not_found(file: &str) -> String {
    format!("Expected file '{}' not found.", file)
}
