//! Command-line front end for the GRAB level editor
//!
//! Usage:
//!   grab-level-editor new level.json --schema tree --title "My Level"
//!   grab-level-editor info level.json
//!   grab-level-editor add level.json sign --at 0,2,0
//!   grab-level-editor set level.json 4 text "Hello"
//!   grab-level-editor duplicate level.json 4
//!   grab-level-editor remove level.json 4
//!   grab-level-editor resave level.json --out normalized.json
//!   grab-level-editor project-init ~/levels
//!
//! Nodes are addressed by id in schema 2 levels and by list index or
//! display id in schema 1 levels.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use grab_level_editor::config::EditorConfig;
use grab_level_editor::flat::{FlatLevel, FlatMaterial, FlatNodeType};
use grab_level_editor::project::Project;
use grab_level_editor::scene::{
    EditorSession, LevelDocument, NodeHandle, PropertyKey, PropertyValue,
};
use grab_level_editor::tree::{TreeLevel, TreeMaterial, TreeNodeType};
use grab_level_editor::world::{
    load_document, read_json, save_json, AnyLevel, Schema, Transform, Vec3,
};

#[derive(Parser)]
#[command(name = "grab-level-editor")]
#[command(version, about = "Create and edit GRAB level files")]
struct Cli {
    /// Spaces per indent level in written files (default from config)
    #[arg(long, global = true)]
    indent: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a new level
    New {
        path: PathBuf,
        /// flat (schema 1) or tree (schema 2)
        #[arg(long)]
        schema: Option<Schema>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the header and node list of a level
    Info { path: PathBuf },
    /// Load and save a level, normalizing its layout
    Resave {
        path: PathBuf,
        /// Write here instead of overwriting the input
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Add a default node of the given type
    Add {
        path: PathBuf,
        node_type: String,
        /// Group to add into (schema 2)
        #[arg(long)]
        parent: Option<String>,
        /// Position as x,y,z
        #[arg(long, value_parser = parse_vec3)]
        at: Option<Vec3>,
    },
    /// Copy a node (and its children) next to the original
    Duplicate { path: PathBuf, node: String },
    /// Delete a node and its children
    Remove { path: PathBuf, node: String },
    /// Change one field of a node
    Set {
        path: PathBuf,
        node: String,
        /// Field name, e.g. position, text, stableTime
        key: String,
        value: String,
    },
    /// Create a project folder with Assets/Textures and remember it
    ProjectInit {
        /// Defaults to the configured project root
        root: Option<PathBuf>,
    },
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    PropertyValue::Vector(Vec3::ZERO)
        .parse_like(s)
        .and_then(|v| v.as_vector())
        .ok_or_else(|| format!("expected x,y,z, got `{}`", s))
}

// =============================================================================
// Schema-specific lookups
// =============================================================================

/// Name and id lookups the command line needs from each schema
trait CliDocument: LevelDocument {
    fn parse_node_type(name: &str) -> Option<Self::NodeType>;

    fn parse_material(name: &str) -> Option<i64>;

    fn resolve(&self, node: &str) -> Option<NodeHandle>;
}

impl CliDocument for FlatLevel {
    fn parse_node_type(name: &str) -> Option<FlatNodeType> {
        FlatNodeType::from_name(name)
    }

    fn parse_material(name: &str) -> Option<i64> {
        FlatMaterial::from_name(name).map(FlatMaterial::code)
    }

    /// List index, or display id
    fn resolve(&self, node: &str) -> Option<NodeHandle> {
        if let Ok(index) = node.parse::<usize>() {
            return self.graph().roots().get(index).copied();
        }
        self.graph().find(|n| n.id == node)
    }
}

impl CliDocument for TreeLevel {
    fn parse_node_type(name: &str) -> Option<TreeNodeType> {
        TreeNodeType::from_name(name)
    }

    fn parse_material(name: &str) -> Option<i64> {
        TreeMaterial::from_name(name).map(TreeMaterial::code)
    }

    fn resolve(&self, node: &str) -> Option<NodeHandle> {
        self.find_by_id(node.parse().ok()?)
    }
}

// =============================================================================
// Commands
// =============================================================================

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = EditorConfig::load();
    let indent = cli.indent.unwrap_or(config.indent);

    match cli.command {
        Commands::New { path, schema, title } => {
            let schema = schema.unwrap_or(config.default_schema);
            let mut level = AnyLevel::new_default(schema);
            if let Some(title) = title {
                match &mut level {
                    AnyLevel::Flat(l) => l.info.title = title,
                    AnyLevel::Tree(l) => l.info.title = title,
                }
            }
            save_json(&level.to_json(), &path, indent)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("created {} level {}", schema, path.display());
            remember(&mut config, &path);
        }
        Commands::Info { path } => {
            let level = load_document(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            match &level {
                AnyLevel::Flat(doc) => print_info(doc),
                AnyLevel::Tree(doc) => print_info(doc),
            }
        }
        Commands::Resave { path, out } => {
            let level = load_document(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let target = out.unwrap_or_else(|| path.clone());
            save_json(&level.to_json(), &target, indent)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!("wrote {} level to {}", level.schema(), target.display());
        }
        Commands::Add { path, node_type, parent, at } => {
            edit_level(&path, indent, |s| s.add(&node_type, parent.as_deref(), at))?;
            remember(&mut config, &path);
        }
        Commands::Duplicate { path, node } => {
            edit_level(&path, indent, |s| s.duplicate(&node))?;
            remember(&mut config, &path);
        }
        Commands::Remove { path, node } => {
            edit_level(&path, indent, |s| s.remove(&node))?;
            remember(&mut config, &path);
        }
        Commands::Set { path, node, key, value } => {
            edit_level(&path, indent, |s| s.set(&node, &key, &value))?;
            remember(&mut config, &path);
        }
        Commands::ProjectInit { root } => {
            let root = root
                .or_else(|| config.project_root.clone())
                .ok_or_else(|| anyhow!("No project folder given and none configured"))?;
            let project = Project::open_or_create(&root)?;
            let textures = project.load_textures();
            println!(
                "Project ready at {} ({} texture file(s) found in {})",
                project.root().display(),
                textures.len(),
                project.textures_dir().display()
            );
            config.project_root = Some(project.root().to_path_buf());
            save_config(&config);
        }
    }

    Ok(())
}

/// Session operations the commands use, independent of the schema
trait ErasedSession {
    fn add(&mut self, node_type: &str, parent: Option<&str>, at: Option<Vec3>) -> Result<String>;
    fn duplicate(&mut self, node: &str) -> Result<String>;
    fn remove(&mut self, node: &str) -> Result<String>;
    fn set(&mut self, node: &str, key: &str, value: &str) -> Result<String>;
}

impl<D: CliDocument> ErasedSession for EditorSession<D> {
    fn add(&mut self, node_type: &str, parent: Option<&str>, at: Option<Vec3>) -> Result<String> {
        let ty = D::parse_node_type(node_type)
            .ok_or_else(|| anyhow!("Unknown node type `{}` for a {} level", node_type, D::SCHEMA))?;
        let parent = parent.map(|p| lookup(self, p)).transpose()?;
        let handle = self.add_node(ty, at.map(Transform::from_position), parent)?;
        Ok(format!("added {}", label(self, handle)))
    }

    fn duplicate(&mut self, node: &str) -> Result<String> {
        let handle = lookup(self, node)?;
        let copy = self.duplicate_node(handle)?;
        Ok(format!("duplicated as {}", label(self, copy)))
    }

    fn remove(&mut self, node: &str) -> Result<String> {
        let handle = lookup(self, node)?;
        let removed = self.remove_node(handle)?;
        Ok(format!("removed {} node(s)", removed))
    }

    fn set(&mut self, node: &str, key: &str, value: &str) -> Result<String> {
        let handle = lookup(self, node)?;
        let key = PropertyKey::from_name(key).ok_or_else(|| anyhow!("Unknown field `{}`", key))?;
        let current = self.property(handle, key).ok_or_else(|| {
            let fields: Vec<_> = self.editable_properties(handle).iter().map(|k| k.name()).collect();
            anyhow!("`{}` does not apply to this node (fields: {})", key, fields.join(", "))
        })?;
        let parsed = match &current {
            PropertyValue::Material(_) => D::parse_material(value).map(PropertyValue::Material),
            _ => None,
        }
        .or_else(|| current.parse_like(value))
        .ok_or_else(|| anyhow!("Cannot read `{}` as a value for `{}`", value, key))?;
        self.set_property(handle, key, parsed.clone())?;
        Ok(format!("set {} = {}", key, parsed))
    }
}

fn lookup<D: CliDocument>(session: &EditorSession<D>, node: &str) -> Result<NodeHandle> {
    session
        .document()
        .resolve(node)
        .ok_or_else(|| anyhow!("No node `{}` in this level", node))
}

fn label<D: LevelDocument>(session: &EditorSession<D>, handle: NodeHandle) -> String {
    session.document().node_label(handle).unwrap_or_default()
}

/// Open a level with the session type matching its schema, apply one edit and save
fn edit_level<F>(path: &Path, indent: usize, edit: F) -> Result<()>
where
    F: FnOnce(&mut dyn ErasedSession) -> Result<String>,
{
    let value = read_json(path).with_context(|| format!("Failed to load {}", path.display()))?;
    match Schema::detect(&value) {
        Schema::Flat => run_edit::<FlatLevel, F>(path, indent, edit),
        Schema::Tree => run_edit::<TreeLevel, F>(path, indent, edit),
    }
}

fn run_edit<D, F>(path: &Path, indent: usize, edit: F) -> Result<()>
where
    D: CliDocument,
    F: FnOnce(&mut dyn ErasedSession) -> Result<String>,
{
    let mut session = EditorSession::<D>::default();
    session.indent = indent;
    session
        .open(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let message = edit(&mut session)?;
    if !session.dirty {
        bail!("Nothing changed");
    }
    session
        .save()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("{}: {}", path.display(), message);
    Ok(())
}

fn print_info<D: LevelDocument>(doc: &D) {
    let info = doc.info();
    println!("Schema:      {}", D::SCHEMA);
    println!("Title:       {}", info.title);
    println!("Creators:    {}", info.creators);
    if !info.description.is_empty() {
        println!("Description: {}", info.description);
    }
    if info.tags.is_some() {
        println!("Tags:        {}", info.tags_string());
    }
    if let Some(complexity) = info.complexity {
        println!("Complexity:  {}", complexity);
    }
    println!("Checkpoints: {}", info.max_checkpoint_count);
    println!("Nodes:       {}", doc.graph().len());
    for (_, line) in doc.node_labels() {
        println!("  {}", line);
    }
}

fn remember(config: &mut EditorConfig, path: &Path) {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    config.push_recent(path);
    save_config(config);
}

fn save_config(config: &EditorConfig) {
    if let Err(e) = config.save() {
        warn!("could not save settings: {}", e);
    }
}
