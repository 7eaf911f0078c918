//! End-to-end run against a temporary repository and a mock backend.
//! No model server needed; useful for seeing the document shape.

use std::sync::Arc;

use readmaker::{ExecCtx, GeneratorConfig, LocalRepository, MockBackend, ReadmeGenerator, TemplateSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("src"))?;
    std::fs::write(dir.path().join("src/main.py"), "print('hello')\n")?;
    std::fs::write(dir.path().join("setup.py"), "from setuptools import setup\n")?;
    std::fs::write(dir.path().join("LICENSE"), "MIT License\n")?;

    let repo = Arc::new(LocalRepository::new(
        "https://github.com/owner/project",
        dir.path(),
    ));

    let mock = Arc::new(MockBackend::new(vec![
        "The MIT license text.".to_string(),
        "Standard setuptools packaging script.".to_string(),
        "A tiny script that prints a greeting.".to_string(),
        "# project\n\nA minimal example project.".to_string(),
        "# Installation\n\n```sh\npip install .\n```".to_string(),
        "# Repository Overview\n\nOne script, one packaging file.".to_string(),
    ]));

    let ctx = ExecCtx::builder("http://unused").backend(mock).build();
    let generator = ReadmeGenerator::new(
        repo,
        TemplateSet::builtin(),
        ctx,
        GeneratorConfig::default().with_model("mock"),
    );

    let readme = generator.generate_readme().await?;
    println!("{}", readme);

    Ok(())
}
