use clap::{Parser, Subcommand};
use paraprint::config::Config;
use paraprint::registry::{display_root, fingerprint, Registry};
use paraprint::submission::{Submission, SubmissionMeta};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "paraprint",
    version,
    about = "Paragraph fingerprinting and exact-match similarity reports"
)]
struct Cli {
    /// Registry directory (default: ./paraprint)
    #[arg(long, default_value = "paraprint")]
    root: PathBuf,

    /// Config file (default: <root>/paraprint.json if present)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new registry
    Init,
    /// Analyse a document and record it
    Submit {
        /// Plain-text document to submit
        file: PathBuf,
        #[arg(long)]
        title: String,
        /// Course code
        #[arg(long)]
        course: String,
        /// Document type
        #[arg(long = "type", default_value = "project")]
        document_type: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        author_id: String,
        #[arg(long)]
        author_name: String,
        #[arg(long, default_value = "")]
        university: String,
    },
    /// Show the similarity report of a submission
    Report { id: String },
    /// List submissions
    List {
        /// Only submissions by this author id
        #[arg(long)]
        author: Option<String>,
    },
    /// List flagged submissions
    Flagged,
    /// Recompute a submission's root digest and compare with the stored one
    Verify { id: String },
    /// Print paragraph hashes and root digest of a document without recording it
    Fingerprint { file: PathBuf },
    /// Show registry statistics
    Stats,
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        init_tracing(&config.log_filter);
        run(&cli, config)
    });

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::discover(&cli.root)?,
    })
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let root = &cli.root;
    match &cli.command {
        Commands::Init => cmd_init(root, config),
        Commands::Submit {
            file,
            title,
            course,
            document_type,
            description,
            author_id,
            author_name,
            university,
        } => {
            let meta = SubmissionMeta {
                title: title.clone(),
                course_code: course.clone(),
                document_type: document_type.clone(),
                description: description.clone(),
                author_id: author_id.clone(),
                author_name: author_name.clone(),
                university: university.clone(),
            };
            cmd_submit(root, config, meta, file)
        }
        Commands::Report { id } => cmd_report(root, config, id),
        Commands::List { author } => cmd_list(root, config, author.as_deref()),
        Commands::Flagged => cmd_flagged(root, config),
        Commands::Verify { id } => cmd_verify(root, config, id),
        Commands::Fingerprint { file } => cmd_fingerprint(config, file),
        Commands::Stats => cmd_stats(root, config),
    }
}

fn cmd_init(root: &Path, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    Registry::init(root, config)?;
    println!("Initialized paraprint registry at {}", root.display());
    Ok(())
}

fn cmd_submit(
    root: &Path,
    config: Config,
    meta: SubmissionMeta,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reg = Registry::open(root, config)?;
    let s = reg.submit_file(meta, file)?;
    println!(
        "[{}] {} — {:.1}% similar, {}",
        short(&s.id),
        s.title,
        s.similarity_score,
        s.status
    );
    println!("root {}", display_root(&s.merkle_root));
    Ok(())
}

fn cmd_report(root: &Path, config: Config, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let reg = Registry::open_existing(root, config)?;
    print_report(&reg.report(id)?);
    Ok(())
}

fn print_report(s: &Submission) {
    println!("{} ({})", s.title, s.id);
    println!(
        "by {} [{}] for {}, {}",
        s.author_name,
        s.author_id,
        s.course_code,
        s.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("similarity {:.1}% — {}", s.similarity_score, s.status);
    println!("root {}", display_root(&s.merkle_root));

    if s.plagiarism_sources.is_empty() {
        println!("(no matching sources)");
    } else {
        println!("sources:");
        for src in &s.plagiarism_sources {
            println!(
                "  {:>5.1}%  {} by {} ({})",
                src.similarity_percentage,
                src.document_title,
                src.author_name,
                short(&src.document_id)
            );
        }
    }

    println!("paragraphs:");
    for (i, p) in s.paragraphs.iter().enumerate() {
        let mark = match &p.source_document_id {
            Some(src) if p.is_plagiarized => format!("! {}", short(src)),
            _ => "  ".to_string(),
        };
        println!("  {:>3} {} {} {}", i + 1, short(&p.hash), mark, p.text.trim());
    }
}

fn cmd_list(
    root: &Path,
    config: Config,
    author: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let reg = Registry::open_existing(root, config)?;
    print_listing(&reg.list(author)?);
    Ok(())
}

fn cmd_flagged(root: &Path, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let reg = Registry::open_existing(root, config)?;
    print_listing(&reg.flagged()?);
    Ok(())
}

fn print_listing(subs: &[Submission]) {
    if subs.is_empty() {
        println!("(no submissions)");
        return;
    }
    for s in subs {
        println!(
            "{} {} {:>5.1}% {:<8} {} — {}",
            short(&s.id),
            s.created_at.format("%Y-%m-%d %H:%M:%S"),
            s.similarity_score,
            s.status,
            s.title,
            s.author_name,
        );
    }
}

fn cmd_verify(root: &Path, config: Config, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let reg = Registry::open_existing(root, config)?;
    let v = reg.verify(id)?;
    print!("{}", v);
    if !v.intact {
        return Err(format!("submission {} failed verification", id).into());
    }
    Ok(())
}

fn cmd_fingerprint(config: Config, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = paraprint::extract::extract_text(file, config.max_upload_bytes)?;
    let fp = fingerprint(&text);
    for p in &fp.paragraphs {
        println!("{} {}", p.hash, p.text.trim());
    }
    println!("root {}", display_root(&fp.root));
    Ok(())
}

fn cmd_stats(root: &Path, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let reg = Registry::open_existing(root, config)?;
    print!("{}", reg.stats()?);
    Ok(())
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
