// CLI command implementations
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use serde_json::{json, Value};

use id3edit::id3::picture::{sniff_image_mime, PictureType};
use id3edit::{AudioFile, Field, FieldUpdate, MetadataRecord, Picture, TagWriter};

use crate::cli::config::{BatchOperation, Commands, Config};
use crate::cli::output::{OutputFormatter, ProgressBar};

/// Dispatch the parsed command line
pub fn run(config: &Config) -> anyhow::Result<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);
    let writer = config.tag_writer();

    match &config.command {
        Commands::Read { files, output } => command_read(files, output.as_deref(), &formatter),
        Commands::Write {
            file,
            set,
            metadata,
            from_file,
            output,
        } => command_write(
            file,
            set,
            metadata.as_deref(),
            from_file.as_deref(),
            output.as_deref(),
            &writer,
            &formatter,
        ),
        Commands::Batch {
            directory,
            pattern,
            operation,
            set,
        } => command_batch(directory, pattern, *operation, set, &writer, &formatter),
        Commands::Detect { files } => {
            command_detect(files, &formatter);
            Ok(())
        }
        Commands::ExportCover { file, output } => command_export_cover(file, output, &formatter),
        Commands::SetCover {
            file,
            image,
            mime_type,
            description,
        } => command_set_cover(file, image, mime_type.as_deref(), description, &writer, &formatter),
        Commands::RemoveCover { files } => command_remove_cover(files, &writer, &formatter),
        Commands::Info { files, detailed } => {
            command_info(files, *detailed, &formatter);
            Ok(())
        }
    }
}

fn open(path: &Path) -> anyhow::Result<AudioFile> {
    AudioFile::open(path).with_context(|| format!("failed to read tag of {}", path.display()))
}

/// JSON view of a file's metadata; picture bytes are summarized
fn metadata_json(audio: &AudioFile) -> anyhow::Result<Value> {
    let record = audio.metadata();
    let mut value = serde_json::to_value(record)?;

    if let Some(obj) = value.as_object_mut() {
        obj.insert(
            "picture".to_string(),
            match &record.picture {
                Some(picture) => json!({
                    "mime_type": picture.mime_type,
                    "picture_type": PictureType::from_u8(picture.picture_type).name(),
                    "description": picture.description,
                    "size": picture.data.len(),
                }),
                None => Value::Null,
            },
        );
        obj.insert("file".to_string(), json!(audio.path.display().to_string()));
        obj.insert("version".to_string(), json!(audio.version()));
    }

    Ok(value)
}

/// Read metadata from files
fn command_read(files: &[PathBuf], output: Option<&Path>, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };

    let mut failures = 0;
    for path in files {
        match open(path).and_then(|audio| metadata_json(&audio)) {
            Ok(metadata) => formatter.output_metadata(&metadata, &mut *writer)?,
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                failures += 1;
            }
        }
    }
    writer.flush()?;

    if failures > 0 {
        bail!("{} of {} files could not be read", failures, files.len());
    }
    Ok(())
}

/// Turn a JSON object into field updates. `"picture": null` removes the
/// picture, a picture object replaces it.
fn apply_json(record: &mut MetadataRecord, json: &str) -> anyhow::Result<()> {
    let value: Value = serde_json::from_str(json).context("invalid metadata JSON")?;
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("metadata JSON must be an object"))?;

    for (key, value) in obj {
        let field = Field::from_name(key).ok_or_else(|| anyhow!("unknown field {:?}", key))?;
        if field == Field::Picture {
            let picture: Option<Picture> =
                serde_json::from_value(value.clone()).context("invalid picture object")?;
            record.set_picture(picture);
            continue;
        }

        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => bail!("field {} needs a string or number, got {}", field, other),
        };
        record.apply(FieldUpdate::new(field, text))?;
    }
    Ok(())
}

fn apply_assignments(record: &mut MetadataRecord, assignments: &[String]) -> anyhow::Result<()> {
    for assignment in assignments {
        let update = FieldUpdate::parse(assignment)
            .with_context(|| format!("bad assignment {:?}, expected FIELD=VALUE", assignment))?;
        record.apply(update)?;
    }
    Ok(())
}

fn save(audio: &AudioFile, record: &MetadataRecord, writer: &TagWriter, target: &Path) -> anyhow::Result<()> {
    audio
        .save(record, writer, target)
        .with_context(|| format!("failed to write {}", target.display()))
}

/// Write metadata to file
fn command_write(
    file: &Path,
    set: &[String],
    metadata: Option<&str>,
    from_file: Option<&Path>,
    output: Option<&Path>,
    writer: &TagWriter,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let audio = open(file)?;
    let mut record = audio.metadata().clone();

    let metadata_json = match from_file {
        Some(path) => Some(
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?,
        ),
        None => metadata.map(str::to_string),
    };
    if let Some(json) = metadata_json {
        apply_json(&mut record, &json)?;
    }
    apply_assignments(&mut record, set)?;

    let target = output.unwrap_or(file);
    save(&audio, &record, writer, target)?;
    formatter.print_success(&format!("Updated metadata for {}", target.display()));
    Ok(())
}

/// Batch process directory
fn command_batch(
    directory: &Path,
    pattern: &str,
    operation: BatchOperation,
    set: &[String],
    writer: &TagWriter,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    if operation == BatchOperation::Write && set.is_empty() {
        bail!("--set is required for the write operation");
    }

    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory.display(), pattern)
    } else {
        format!("{}/**/{}", directory.display(), pattern)
    };

    let mut files = Vec::new();
    for entry in glob::glob(&glob_pattern).with_context(|| format!("invalid glob pattern {}", glob_pattern))? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("Running {} on {} files...", operation, files.len()));

    let mut progress = ProgressBar::new(files.len(), !formatter.quiet);
    let mut success_count = 0;
    let mut error_count = 0;

    for path in &files {
        let result = open(path).and_then(|audio| match operation {
            BatchOperation::Read => metadata_json(&audio).map(|_| ()),
            BatchOperation::Write => {
                let mut record = audio.metadata().clone();
                apply_assignments(&mut record, set)?;
                save(&audio, &record, writer, path)
            }
        });
        progress.increment(&path.display().to_string());

        match result {
            Ok(()) => success_count += 1,
            Err(e) => {
                formatter.print_error(&format!("{:#}", e));
                error_count += 1;
            }
        }
    }

    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        success_count, error_count
    ));
    Ok(())
}

/// Detect tag version
fn command_detect(files: &[PathBuf], formatter: &OutputFormatter) {
    for path in files {
        match AudioFile::open(path) {
            Ok(audio) => formatter.print_info(&format!(
                "{}: {} (version: {})",
                path.display(),
                audio.file_type(),
                audio.version()
            )),
            Err(e) => formatter.print_error(&format!("{}: Unknown format ({})", path.display(), e)),
        }
    }
}

/// Export cover art
fn command_export_cover(file: &Path, output_dir: &Path, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let audio = open(file)?;
    let picture = audio
        .metadata()
        .picture
        .as_ref()
        .ok_or_else(|| anyhow!("{} has no cover picture", file.display()))?;

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    let target = output_dir.join(format!("{}.{}", stem, picture.extension()));

    fs::create_dir_all(output_dir).with_context(|| format!("cannot create {}", output_dir.display()))?;
    fs::write(&target, &picture.data).with_context(|| format!("cannot write {}", target.display()))?;
    formatter.print_success(&format!("Exported cover to {}", target.display()));
    Ok(())
}

/// Set cover art
fn command_set_cover(
    file: &Path,
    image: &Path,
    mime_type: Option<&str>,
    description: &str,
    writer: &TagWriter,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let data = fs::read(image).with_context(|| format!("cannot read {}", image.display()))?;
    let mime_type = match mime_type {
        Some(mime) => mime.to_string(),
        None => sniff_image_mime(&data)
            .ok_or_else(|| anyhow!("{} is neither JPEG nor PNG", image.display()))?
            .to_string(),
    };

    let audio = open(file)?;
    let mut record = audio.metadata().clone();
    let mut picture = Picture::new(data, mime_type);
    picture.description = description.to_string();
    record.set_picture(Some(picture));

    save(&audio, &record, writer, file)?;
    formatter.print_success(&format!("Set cover of {}", file.display()));
    Ok(())
}

/// Remove cover art
fn command_remove_cover(files: &[PathBuf], writer: &TagWriter, formatter: &OutputFormatter) -> anyhow::Result<()> {
    for path in files {
        let result = open(path).and_then(|audio| {
            let mut record = audio.metadata().clone();
            record.set_picture(None);
            save(&audio, &record, writer, path)
        });
        match result {
            Ok(()) => formatter.print_success(&format!("Removed cover from {}", path.display())),
            Err(e) => formatter.print_error(&format!("{:#}", e)),
        }
    }
    Ok(())
}

/// Show detailed file information
fn command_info(files: &[PathBuf], detailed: bool, formatter: &OutputFormatter) {
    for path in files {
        let file_meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", path.display(), e));
                continue;
            }
        };

        println!("\n{}", path.display());
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", file_meta.len());
        if let Ok(modified) = file_meta.modified() {
            let date: chrono::DateTime<chrono::Local> = modified.into();
            println!("Modified: {}", date.format("%Y-%m-%d %H:%M:%S"));
        }

        let audio = match AudioFile::open(path) {
            Ok(audio) => audio,
            Err(e) => {
                println!("Format: Unknown ({})", e);
                continue;
            }
        };
        println!("Format: {}", audio.file_type());
        println!("Version: {}", audio.version());
        println!("Tag size: {} bytes", audio.tag_size());
        println!("Audio size: {} bytes", audio.audio().len());
        println!("Skipped frames: {}", audio.issues().len());

        if detailed {
            for issue in audio.issues() {
                println!("  {} @ {}: {}", issue.frame_id, issue.offset, issue.error);
            }
            let record = audio.metadata();
            for field in Field::all() {
                println!("  {:<14} {}", field.as_str(), record.get(field));
            }
        }
    }
}
