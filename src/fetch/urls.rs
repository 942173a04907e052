// src/fetch/urls.rs
use anyhow::Result;
use url::Url;

static GEO_DOWNLOAD_BASE: &str = "https://www.ncbi.nlm.nih.gov/geo/download/";

/// Build the download URL for a series' supplementary-file archive,
/// e.g. `https://www.ncbi.nlm.nih.gov/geo/download/?acc=GSE68849&format=file`.
pub fn supplementary_url(accession: &str) -> Result<Url> {
    let mut url = Url::parse(GEO_DOWNLOAD_BASE)?;
    url.query_pairs_mut()
        .append_pair("acc", accession)
        .append_pair("format", "file");
    Ok(url)
}
