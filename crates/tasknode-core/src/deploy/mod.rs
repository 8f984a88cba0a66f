//! Deploy package assembly.
//!
//! A deploy package is a staged copy of the working directory plus a frozen
//! dependency list and a run-metadata record, compressed into a zip archive.
//! Both the staging directory and the archive live in the working directory
//! and are removed when the returned `DeployPackage` is dropped.

pub mod archive;
pub mod environment;
pub mod exclude;
pub mod packager;
pub mod snapshot;

pub use environment::{filter_requirements, EnvironmentProbe, OsKind, SystemProbe};
pub use exclude::ExclusionRules;
pub use packager::{DeployPackage, DeployPackager, RunInfo};

/// Package name filtered out of the dependency manifest
pub const PRODUCT_NAME: &str = "tasknode";

/// Staging directory, relative to the working directory
pub const STAGING_DIR_NAME: &str = "tasknode_deploy";

/// Archive file, relative to the working directory
pub const ARCHIVE_NAME: &str = "tasknode_deploy.zip";

/// Dependency manifest written into the staging directory
pub const REQUIREMENTS_FILE: &str = "requirements-tasknode.txt";

/// Run metadata written into the staging directory
pub const RUN_INFO_FILE: &str = "run_info.json";
