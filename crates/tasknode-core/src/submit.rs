//! The submit workflow: authenticate, package, request an upload URL,
//! upload, clean up.

use std::path::Path;

use tracing::info;

use crate::api::AuthApi;
use crate::auth::{SecretStore, SessionManager};
use crate::deploy::{DeployPackager, EnvironmentProbe};
use crate::error::{Error, Result};

/// Progress notifications for the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStage {
    Authenticating,
    Packaging,
    RequestingUpload,
    Uploading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub script: String,
    pub archive_bytes: usize,
}

/// Submit `script` from `working_dir` for remote execution.
///
/// The staging directory and archive are removed on every exit path.
pub async fn submit<A, S, P, F>(
    session: &SessionManager<A, S>,
    packager: &DeployPackager<P>,
    working_dir: &Path,
    script: &str,
    mut on_stage: F,
) -> Result<SubmitReceipt>
where
    A: AuthApi,
    S: SecretStore,
    P: EnvironmentProbe,
    F: FnMut(SubmitStage),
{
    on_stage(SubmitStage::Authenticating);
    let access_token = session.get_valid_token().await?;

    let script = packager.validate_script(working_dir, script)?;

    on_stage(SubmitStage::Packaging);
    let package = packager.build(working_dir, &script)?;

    on_stage(SubmitStage::RequestingUpload);
    let destination = session.api().get_upload_url(&access_token).await?;

    let body = tokio::fs::read(package.archive_path())
        .await
        .map_err(|e| Error::Upload(format!("Failed to read archive: {}", e)))?;
    let archive_bytes = body.len();

    on_stage(SubmitStage::Uploading);
    session.api().upload(&destination, body).await?;

    drop(package);
    info!(script = %script, bytes = archive_bytes, "Deploy package uploaded");
    Ok(SubmitReceipt {
        script,
        archive_bytes,
    })
}
