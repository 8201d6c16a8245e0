// Symposium CLI - operator tool for the research gallery

mod client;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use client::ApiClient;
use symposium_core::import::ProjectRow;
use symposium_core::{classify, FileKind, Roster};

/// Symposium - gallery administration tool
#[derive(Parser)]
#[command(name = "symposium")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the gallery server
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    server: String,

    /// Admin session token (falls back to the SYMPOSIUM_TOKEN env var)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a session token
    Login {
        /// Admin username
        username: String,
    },
    /// Classify filenames locally without touching the server
    Classify {
        /// Filenames or paths to classify
        #[arg(value_name = "FILE", required = true)]
        paths: Vec<String>,

        /// Roster JSON file (defaults to the built-in table)
        #[arg(long)]
        roster: Option<PathBuf>,
    },
    /// Import projects from a CSV file
    Import {
        /// Path to the CSV file
        path: PathBuf,
    },
    /// Upload a directory of files and reconcile them against projects
    Reconcile {
        /// Directory containing the submission files
        dir: PathBuf,

        /// Preview the matches without committing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Seed the gallery with the sample projects
    Seed,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var("SYMPOSIUM_TOKEN").ok());
    let client = ApiClient::new(cli.server.clone(), token);

    match cli.command {
        Commands::Login { username } => login(&client, &username),
        Commands::Classify { paths, roster } => classify_files(&paths, roster.as_deref()),
        Commands::Import { path } => import_csv(&client, &path),
        Commands::Reconcile { dir, dry_run } => reconcile_dir(&client, &dir, dry_run),
        Commands::Seed => seed(&client),
    }
}

fn login(client: &ApiClient, username: &str) -> Result<()> {
    let password = rpassword::prompt_password("Password: ").context("failed to read password")?;
    let response = client.login(username, &password)?;

    println!("{} logged in as {}", "ok:".green().bold(), response.account.username);
    if !response.account.is_admin {
        println!(
            "{} this account is not an admin; admin commands will be refused",
            "warning:".yellow().bold()
        );
    }
    println!("token:      {}", response.token);
    println!("expires at: {}", response.expires_at);
    println!();
    println!("export SYMPOSIUM_TOKEN={}", response.token);
    Ok(())
}

fn classify_files(paths: &[String], roster_path: Option<&Path>) -> Result<()> {
    let roster = match roster_path {
        Some(path) => Roster::from_path(path)
            .with_context(|| format!("failed to load roster from {}", path.display()))?,
        None => Roster::default(),
    };

    for path in paths {
        // Classification works on the bare filename, not the path.
        let filename = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);
        let classification = classify(filename, &roster);

        let kind = match classification.kind {
            FileKind::Poster => "poster".green(),
            FileKind::Presentation => "presentation".blue(),
            FileKind::Unknown => "unknown".yellow(),
        };
        let group = classification
            .candidate_group
            .map(|g| g.bold().to_string())
            .unwrap_or_else(|| "-".dimmed().to_string());
        println!("{filename}: {kind} / {group}");
    }
    Ok(())
}

fn import_csv(client: &ApiClient, path: &Path) -> Result<()> {
    let rows = read_rows(path)?;
    println!("read {} rows from {}", rows.len(), path.display());

    let report = client.import_rows(&rows)?;
    print_import_report(report.created, &report.errors);
    Ok(())
}

fn seed(client: &ApiClient) -> Result<()> {
    let report = client.import_rows(&sample_rows())?;
    print_import_report(report.created, &report.errors);
    Ok(())
}

fn reconcile_dir(client: &ApiClient, dir: &Path, dry_run: bool) -> Result<()> {
    let files = scan_dir(dir)?;
    if files.is_empty() {
        anyhow::bail!("no files found in {}", dir.display());
    }

    for path in &files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("non-UTF-8 filename")?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let stored = client.upload_intake(filename, &bytes)?;
        println!("uploaded {} -> {}", filename, stored.stored_filename.dimmed());
    }

    let report = client.reconcile(dry_run)?;
    println!();
    if dry_run {
        println!("{} (dry run, nothing committed)", "reconcile preview".bold());
    } else {
        println!("{}", "reconcile committed".bold());
    }
    for group in &report.groups {
        match &group.project_id {
            Some(id) => println!(
                "  {} {} -> project {} ({} file(s))",
                "matched".green(),
                group.label,
                id,
                group.files_assigned
            ),
            None => println!("  {} {}", "unmatched".yellow(), group.label),
        }
    }
    for file in &report.unmatched_files {
        println!("  {} {}", "unassigned".yellow(), file);
    }
    println!(
        "{} group(s) matched, {} file(s) left over",
        report.matched,
        report.unmatched_files.len()
    );
    Ok(())
}

/// Reads and deserializes CSV rows; a malformed file is a hard error, while
/// per-row validation happens server-side.
fn read_rows(path: &Path) -> Result<Vec<ProjectRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<ProjectRow>().enumerate() {
        let row = record.with_context(|| format!("unreadable CSV row {index}"))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Regular files in a directory, sorted by name for a stable upload order.
fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn print_import_report(created: usize, errors: &[client::RowErrorInfo]) {
    println!("{} {} project(s) created", "ok:".green().bold(), created);
    for error in errors {
        println!(
            "  {} row {}: {}",
            "rejected".red(),
            error.index,
            error.reason
        );
    }
}

/// The three sample projects shipped with the original gallery.
fn sample_rows() -> Vec<ProjectRow> {
    let samples = [
        (
            "Team Alpha",
            "John Doe",
            "Jane Smith",
            "Mobile UI Design Patterns: A Comprehensive Analysis",
            "User Experience Optimization in Mobile Applications",
            "https://www.youtube.com/watch?v=example1",
            "mobile, ui design, user experience, interface",
        ),
        (
            "Team Beta",
            "Alice Johnson",
            "Bob Wilson",
            "Web Accessibility Implementation: Best Practices",
            "Inclusive Design Principles for Digital Interfaces",
            "https://www.youtube.com/watch?v=example2",
            "accessibility, web design, inclusive design, ui design",
        ),
        (
            "Team Gamma",
            "Carol Davis",
            "David Brown",
            "VR in Educational Contexts: A Meta-Analysis",
            "Immersive Learning Environments: Design and Implementation",
            "https://www.youtube.com/watch?v=example3",
            "virtual reality, education, immersive learning, technology",
        ),
    ];

    samples
        .into_iter()
        .map(
            |(group, member1, member2, paper1, paper2, video, tags)| ProjectRow {
                group_name: group.to_string(),
                member1_name: member1.to_string(),
                member2_name: member2.to_string(),
                paper1_title: paper1.to_string(),
                paper2_title: paper2.to_string(),
                member1_paper: None,
                member2_paper: None,
                presentation_video_url: Some(video.to_string()),
                tags: Some(tags.to_string()),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use symposium_core::import::validate_rows;

    #[test]
    fn test_sample_rows_are_valid() {
        let rows = sample_rows();
        let (valid, errors) = validate_rows(&rows);
        assert_eq!(valid.len(), 3);
        assert!(errors.is_empty());
        // Member papers default to the general paper titles.
        assert_eq!(valid[0].member1_paper, rows[0].paper1_title);
    }

    #[test]
    fn test_scan_dir_is_sorted_and_skips_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"b").unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = scan_dir(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_read_rows_parses_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.csv");
        std::fs::write(
            &path,
            "group_name,member1_name,member2_name,paper1_title,paper2_title\n\
             Team Alpha,John Doe,Jane Smith,Paper One,Paper Two\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_name, "Team Alpha");
    }
}
