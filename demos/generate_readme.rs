use std::sync::Arc;

use readmaker::events::{Event, FnEventHandler};
use readmaker::{
    BackoffConfig, ExecCtx, GeneratorConfig, LocalRepository, ReadmeGenerator, TemplateSet,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let checkout = args.next().unwrap_or_else(|| ".".to_string());
    let repo_url = args
        .next()
        .unwrap_or_else(|| "https://github.com/owner/project".to_string());

    let repo = Arc::new(LocalRepository::new(repo_url, checkout));

    // Print progress as files are summarized and sections generated.
    let handler = Arc::new(FnEventHandler(|event: Event| match event {
        Event::FilesListed { total } => println!("Found {} files", total),
        Event::SummaryStart { path } => println!("  summarizing {}", path),
        Event::SummaryFailed { path, reason } => println!("  skipped {}: {}", path, reason),
        Event::SectionStart { section } => println!("Generating section: {}", section),
        _ => {}
    }));

    let ctx = ExecCtx::builder("http://localhost:11434")
        .backoff(BackoffConfig::standard())
        .event_handler(handler)
        .build();

    let generator = ReadmeGenerator::new(
        repo,
        TemplateSet::builtin(),
        ctx,
        GeneratorConfig::default().with_model("llama3.2:3b"),
    );

    if generator.existing_readme().is_some() {
        println!("Note: the repository already has a README; writing README.generated.md");
    }

    let readme = generator.generate_readme().await?;
    readmaker::write_readme("README.generated.md", &readme)?;
    println!("\nWrote README.generated.md ({} bytes)", readme.len());

    Ok(())
}
