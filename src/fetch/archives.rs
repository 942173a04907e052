// src/fetch/archives.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::fetch::urls::supplementary_url;

/// Download the supplementary-file tar for `accession` and save it under
/// `dest_dir` as `{accession}_RAW.tar`. Returns the full path of the saved
/// file. The GEO download URL carries no filename in its path, so the name
/// is derived from the accession.
pub async fn download_tar(
    client: &Client,
    accession: &str,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let url = supplementary_url(accession)?;
    let dest_path = dest_dir.join(format!("{accession}_RAW.tar"));

    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("creating {}", dest_dir.display()))?;

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("requesting archive for {accession}"))?
        .error_for_status()
        .with_context(|| format!("archive request for {accession} rejected"))?;
    let bytes = resp.bytes().await?;
    fs::write(&dest_path, &bytes)
        .await
        .with_context(|| format!("writing {}", dest_path.display()))?;

    Ok(dest_path)
}
