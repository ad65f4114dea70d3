pub(crate) const DEFAULT_SHELL: &str = "sh";
pub(crate) const DEFAULT_P4_BIN: &str = "p4";
pub(crate) const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;
pub(crate) const MACOS_SHELL_SETUP: &str = "source ~/.bash_profile";

pub(crate) const USER_NAME_LABEL: &str = "User name:";
pub(crate) const CLIENT_ROOT_LABEL: &str = "Client root:";
pub(crate) const CLIENT_UNKNOWN_LINE: &str = "Client unknown.";
pub(crate) const UNSET_CLIENT_ROOTS: &[&str] = &["null", "*unknown*"];

pub(crate) const DESCRIPTION_LABEL: &str = "Description:";
pub(crate) const FILES_LABEL: &str = "Files:";
pub(crate) const STATUS_LABEL: &str = "Status:";
pub(crate) const SUBMITTED_STATUS: &str = "submitted";
pub(crate) const SPEC_INDENT: &str = "\t";

pub(crate) const DEFAULT_CHANGELIST: &str = "default";
pub(crate) const CHANGE_LINE_PREFIX: &str = "Change ";
pub(crate) const PENDING_ID_TOKEN: usize = 1;
pub(crate) const PENDING_DESCRIPTION_TOKEN: usize = 7;

pub(crate) const DEFAULT_LINE_SEPARATOR: &str = "\n";
pub(crate) const DEFAULT_GRAPHICAL_DIFF_COMMAND: &str = "p4merge %depofile_path %file_path";
pub(crate) const DEPOT_FILE_PATH_PLACEHOLDER: &str = "%depofile_path";
pub(crate) const DEPOT_FILE_NAME_PLACEHOLDER: &str = "%depofile_name";
pub(crate) const LOCAL_FILE_PATH_PLACEHOLDER: &str = "%file_path";
pub(crate) const LOCAL_FILE_NAME_PLACEHOLDER: &str = "%file_name";
pub(crate) const DEPOT_TEMP_PREFIX: &str = "p4act-depot-";

pub(crate) const STATUS_PREFIX: &str = "p4act";
