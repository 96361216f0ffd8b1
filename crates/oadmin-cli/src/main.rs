use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use oadmin_core::config::{self, CONFIG_FILE_NAME, OadminConfig};
use oadmin_core::parse::{self, document::ApiDocument};
use oadmin_core::transform::{self, BuildOptions};
use oadmin_core::{Catalog, ResourceDescriptor, Verb};
use oadmin_ui::Form;
use oadmin_ui::html::render_form;

#[derive(Parser)]
#[command(name = "oadmin", about = "Schema-driven admin catalog tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an API description and build its resource catalog
    Validate {
        /// Path to the API description (YAML or JSON); defaults to the config `input`
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the resource catalog
    Inspect {
        /// Path to the API description
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Only show this resource
        #[arg(short, long)]
        resource: Option<String>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Render the create form of a resource as HTML
    Preview {
        /// Path to the API description
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Resource to preview
        #[arg(short, long)]
        resource: String,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check and list the capability policy from the config file
    Capabilities,

    /// Initialize a new oadmin configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect {
            input,
            resource,
            format,
        } => cmd_inspect(input, resource, format),

        Commands::Preview {
            input,
            resource,
            output,
        } => cmd_preview(input, &resource, output),

        Commands::Capabilities => cmd_capabilities(),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oadmin", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config file from the current directory, if present.
fn try_load_config() -> Result<Option<OadminConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let cfg = config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))?;
    if cfg.is_none() {
        log::debug!("no {CONFIG_FILE_NAME} in the current directory, using defaults");
    }
    Ok(cfg)
}

fn read_document(path: &Path) -> Result<ApiDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");
    log::debug!("reading API description {} as {ext}", path.display());

    let doc = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(doc)
}

fn load_catalog(input: Option<PathBuf>, cfg: &OadminConfig) -> Result<(ApiDocument, Catalog)> {
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let doc = read_document(&input)?;
    let catalog = transform::build_catalog_with_options(&doc, &BuildOptions::from(&cfg.catalog));
    log::info!(
        "built catalog of {} resource(s) from {}",
        catalog.len(),
        input.display()
    );
    Ok((doc, catalog))
}

fn find_resource<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a ResourceDescriptor> {
    catalog.find(name).with_context(|| {
        format!(
            "no resource named `{name}`; available: {}",
            catalog.names().collect::<Vec<_>>().join(", ")
        )
    })
}

fn cmd_validate(input: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let (doc, catalog) = load_catalog(input, &cfg)?;

    let title = doc.info.as_ref().map(|i| i.title.as_str()).unwrap_or("");
    eprintln!(
        "Valid API description {}: {}",
        doc.version().unwrap_or("(unversioned)"),
        title
    );
    eprintln!("  Paths: {}", doc.paths.len());
    eprintln!("  Schemas: {}", doc.schema_count());
    eprintln!("  Resources: {}", catalog.len());
    eprintln!("  Endpoints: {}", catalog.endpoint_count());

    for resource in catalog.resources() {
        if resource.schema.is_none() {
            eprintln!("  note: `{}` has no schema; its form has no fields", resource.name);
        }
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: Option<PathBuf>, resource: Option<String>, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let (_, catalog) = load_catalog(input, &cfg)?;

    let summary = match resource {
        Some(name) => resource_summary(find_resource(&catalog, &name)?),
        None => serde_json::json!({
            "resources": catalog.resources().iter().map(resource_summary).collect::<Vec<_>>(),
        }),
    };

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn resource_summary(resource: &ResourceDescriptor) -> serde_json::Value {
    let endpoints: Vec<serde_json::Value> = resource
        .endpoints
        .iter()
        .map(|op| {
            serde_json::json!({
                "method": op.method.as_str(),
                "path": op.path,
                "summary": op.summary,
            })
        })
        .collect();

    let fields: Vec<serde_json::Value> = resource
        .fields()
        .iter()
        .map(|f| {
            let mut field = serde_json::json!({
                "name": f.name,
                "kind": f.kind.as_str(),
                "required": f.required,
            });
            if !f.enum_values.is_empty() {
                field["options"] = serde_json::json!(f.enum_values);
            }
            if let Some(item) = f.item_kind {
                field["items"] = serde_json::json!(item.as_str());
            }
            if f.read_only {
                field["read_only"] = serde_json::json!(true);
            }
            field
        })
        .collect();

    serde_json::json!({
        "name": resource.name,
        "schema": resource.schema.as_ref().map(|s| s.name.as_str()),
        "endpoints": endpoints,
        "fields": fields,
    })
}

fn cmd_preview(input: Option<PathBuf>, resource: &str, output: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let (_, catalog) = load_catalog(input, &cfg)?;
    let descriptor = find_resource(&catalog, resource)?;

    let form = Form::new(descriptor.editable_fields());
    let html = render_form(&form, Some(&format!("New {}", descriptor.name)))
        .with_context(|| format!("failed to render the `{}` form", descriptor.name))?;

    match output {
        Some(path) => {
            fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}

fn cmd_capabilities() -> Result<()> {
    let Some(cfg) = try_load_config()? else {
        eprintln!("No {CONFIG_FILE_NAME} found; every resource uses the default policy.");
        return Ok(());
    };

    if cfg.resources.is_empty() {
        eprintln!("No resource policies declared; every resource uses the default policy.");
    }
    for (name, policy) in &cfg.resources {
        for verb in Verb::ALL {
            match policy.verb(verb) {
                Some(declared) => println!("{name}.{verb}: {declared}"),
                None => println!("{name}.{verb}: default"),
            }
        }
    }

    cfg.check_policies()
        .map_err(|e| anyhow::anyhow!(e))
        .context("capability policy is invalid")?;
    eprintln!("Capability policy OK.");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
