//! `pack.mcmeta`/`pack.png`/`credits.txt` emission and final output
//! compression (spec §6 "Output tree").

use combiner_core::error::{CombinerError, Result};
use combiner_core::pack::Pack;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::Path;

const PACK_FORMAT: u32 = 15;

/// `output/CORE_Pack/pack.mcmeta`, describing the combined pack.
pub fn emit_pack_mcmeta(output_root: &Path, contributing_packs: &[String]) -> Result<()> {
    let description = format!("Combined from: {}", contributing_packs.join(", "));
    let mcmeta = json!({ "pack": { "pack_format": PACK_FORMAT, "description": description } });
    combiner_core::schema::write_json_pretty(&output_root.join("pack.mcmeta"), &combiner_core::bag::Bag(mcmeta))
}

/// `output/CORE_Pack/credits.txt`, one contributing pack name per line.
pub fn emit_credits(output_root: &Path, contributing_packs: &[String]) -> Result<()> {
    let path = output_root.join("credits.txt");
    let text = contributing_packs.join("\n");
    fs::write(&path, text).map_err(|source| CombinerError::Io { path, source })
}

/// Copies the first `pack.png` found among `packs` (base pack preferred)
/// into the output root; a missing icon across every pack only warns.
pub fn emit_pack_png(packs: &[Pack], output_root: &Path) -> Result<()> {
    let mut ordered: Vec<&Pack> = packs.iter().collect();
    ordered.sort_by_key(|p| !p.is_base);

    for pack in ordered {
        let candidate = pack.extracted_root.join("pack.png");
        if candidate.is_file() {
            let dest = output_root.join("pack.png");
            return fs::copy(&candidate, &dest)
                .map(|_| ())
                .map_err(|source| CombinerError::Io { path: dest, source });
        }
    }
    tracing::warn!("no pack.png found among any contributing pack; output will have no icon");
    Ok(())
}

/// Compress the whole `output_root` directory into a sibling
/// `<dir-name>.zip`.
pub fn compress_output(output_root: &Path) -> Result<std::path::PathBuf> {
    let zip_path = output_root.with_extension("zip");
    let file = fs::File::create(&zip_path).map_err(|source| CombinerError::Io {
        path: zip_path.clone(),
        source,
    })?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut entries: Vec<_> = walkdir::WalkDir::new(output_root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    entries.sort();

    for entry in &entries {
        let relative = entry.strip_prefix(output_root).unwrap_or(entry);
        writer
            .start_file(relative.to_string_lossy(), options)
            .map_err(|err| CombinerError::ExtractionFailed {
                source_path: zip_path.clone(),
                reason: err.to_string(),
            })?;
        let bytes = fs::read(entry).map_err(|source| CombinerError::Io {
            path: entry.clone(),
            source,
        })?;
        writer.write_all(&bytes).map_err(|source| CombinerError::Io {
            path: zip_path.clone(),
            source,
        })?;
    }
    writer.finish().map_err(|err| CombinerError::ExtractionFailed {
        source_path: zip_path.clone(),
        reason: err.to_string(),
    })?;

    Ok(zip_path)
}
