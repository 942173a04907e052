use anyhow::Result;
use geoprep::{fetch, process};
use reqwest::Client;
use std::{env, fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_ACCESSION: &str = "GSE68849";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,geoprep=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure run ────────────────────────────────────────────
    let mut args = env::args().skip(1);
    let accession = args.next().unwrap_or_else(|| DEFAULT_ACCESSION.to_string());
    let out_root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("supplementary_files"));
    fs::create_dir_all(&out_root)?;

    // ─── 3) download the supplementary archive ───────────────────────
    let client = Client::new();
    info!(accession = %accession, "downloading supplementary archive");
    let tar_path = fetch::archives::download_tar(&client, &accession, &out_root).await?;
    info!(tar = %tar_path.display(), "downloaded");

    // ─── 4) unpack members into per-sample table files ───────────────
    let summary = tokio::task::spawn_blocking({
        let out_root = out_root.clone();
        move || process::unpack_tar(&tar_path, &out_root)
    })
    .await??;

    info!(
        ok = summary.members_ok,
        failed = summary.members_failed,
        files = summary.outputs.len(),
        "all done"
    );
    if summary.members_failed > 0 {
        anyhow::bail!("{} member(s) failed; see log for details", summary.members_failed);
    }
    Ok(())
}
