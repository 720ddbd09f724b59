//! Model (.modl) command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;

use rox_import::{ImportOptions, WeightCalibration, import_model};
use rox_model::header::INDEX_SIZE;
use rox_model::{MaterialRef, Mesh, Model, validate_model};

use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_spinner, create_table, format_bytes,
    render_tree,
};

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Import a glTF scene and write it as a model file
    Import {
        /// Source glTF (.gltf or .glb) file
        source: PathBuf,

        /// Output model file (defaults to the source name with a .modl extension)
        output: Option<PathBuf>,

        /// Write skinned vertices with bone indices and weights
        #[arg(short, long)]
        skinned: bool,

        /// Pack all scene meshes into one mesh with several submeshes
        #[arg(short, long)]
        pack: bool,

        /// Rescale vertex weights proportionally instead of topping them up
        #[arg(long)]
        normalize_weights: bool,

        /// Material name bound to the model
        #[arg(short, long, default_value = "default")]
        material: String,
    },

    /// Display information about a model file
    Info {
        /// Path to the model file
        file: PathBuf,

        /// Show per-mesh and per-submesh details
        #[arg(short, long)]
        detailed: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the bone hierarchy and meshes as a tree
    Tree {
        /// Path to the model file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show metadata inline
        #[arg(long)]
        compact: bool,
    },

    /// Check a model file for structural problems
    Validate {
        /// Path to the model file
        file: PathBuf,
    },
}

pub fn execute(cmd: ModelCommands) -> Result<()> {
    match cmd {
        ModelCommands::Import {
            source,
            output,
            skinned,
            pack,
            normalize_weights,
            material,
        } => {
            let calibration = if normalize_weights {
                WeightCalibration::Normalize
            } else {
                WeightCalibration::Iterative
            };
            let options = ImportOptions::new()
                .with_skinned(skinned)
                .with_pack_meshes(pack)
                .with_calibration(calibration);
            let output = output.unwrap_or_else(|| source.with_extension("modl"));
            handle_import(&source, &output, &material, &options)
        }
        ModelCommands::Info {
            file,
            detailed,
            json,
        } => handle_info(&file, detailed, json),
        ModelCommands::Tree {
            file,
            depth,
            no_color,
            compact,
        } => handle_tree(&file, depth, no_color, compact),
        ModelCommands::Validate { file } => handle_validate(&file),
    }
}

fn load_model(file: &Path) -> Result<Model> {
    Model::load(file, MaterialRef::default())
        .with_context(|| format!("Failed to load model file: {}", file.display()))
}

fn handle_import(
    source: &Path,
    output: &Path,
    material: &str,
    options: &ImportOptions,
) -> Result<()> {
    let spinner = create_spinner(&format!("Importing {}...", source.display()));
    let model = import_model(source, MaterialRef::new(material), options)
        .with_context(|| format!("Failed to import {}", source.display()));
    spinner.finish_and_clear();
    let model = model?;

    model
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    println!(
        "✓ Wrote {} ({}): {} bones, {} meshes, {} vertices, {} indices",
        output.display(),
        format_bytes(size),
        model.num_bones(),
        model.num_meshes(),
        model.vertex_count(),
        model.index_count()
    );
    Ok(())
}

#[derive(Serialize)]
struct ModelSummary {
    name: String,
    file_size: u64,
    skinned: bool,
    bones: usize,
    vertices: usize,
    indices: usize,
    meshes: Vec<MeshSummary>,
}

#[derive(Serialize)]
struct MeshSummary {
    name: String,
    skinned: bool,
    vertex_size: u32,
    vertices: usize,
    indices: usize,
    triangles: usize,
    bone_influences: Vec<u32>,
    submeshes: Vec<SubmeshSummary>,
}

#[derive(Serialize)]
struct SubmeshSummary {
    name: String,
    material_index: u32,
    start_index: u32,
    index_count: u32,
    vertex_offset: u32,
}

impl ModelSummary {
    fn new(model: &Model, file_size: u64) -> Self {
        Self {
            name: model.name.clone(),
            file_size,
            skinned: model.is_skinned(),
            bones: model.num_bones(),
            vertices: model.vertex_count(),
            indices: model.index_count(),
            meshes: model.meshes.iter().map(MeshSummary::new).collect(),
        }
    }
}

impl MeshSummary {
    fn new(mesh: &Mesh) -> Self {
        Self {
            name: mesh.name.clone(),
            skinned: mesh.is_skinned(),
            vertex_size: mesh.vertices.vertex_size(),
            vertices: mesh.vertex_count(),
            indices: mesh.index_count(),
            triangles: mesh.triangle_count(),
            bone_influences: mesh.bone_influences.clone(),
            submeshes: mesh
                .submeshes
                .iter()
                .map(|submesh| SubmeshSummary {
                    name: submesh.name.clone(),
                    material_index: submesh.material_index,
                    start_index: submesh.start_index,
                    index_count: submesh.index_count,
                    vertex_offset: submesh.vertex_offset,
                })
                .collect(),
        }
    }
}

fn handle_info(file: &Path, detailed: bool, json: bool) -> Result<()> {
    let model = load_model(file)?;
    let file_size = std::fs::metadata(file)?.len();
    let summary = ModelSummary::new(&model, file_size);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Model Information");
    println!("=================");
    println!();
    println!("Name:      {}", summary.name);
    println!("File size: {}", format_bytes(summary.file_size));
    println!("Skinned:   {}", if summary.skinned { "yes" } else { "no" });
    println!("Bones:     {}", summary.bones);
    println!("Meshes:    {}", summary.meshes.len());
    println!("Vertices:  {}", summary.vertices);
    println!("Indices:   {}", summary.indices);

    if summary.meshes.is_empty() {
        return Ok(());
    }

    println!();
    let mut table = create_table(&[
        "Mesh",
        "Vertex Size",
        "Vertices",
        "Triangles",
        "Submeshes",
        "Bones",
    ]);
    for mesh in &summary.meshes {
        add_table_row(
            &mut table,
            vec![
                mesh.name.clone(),
                mesh.vertex_size.to_string(),
                mesh.vertices.to_string(),
                mesh.triangles.to_string(),
                mesh.submeshes.len().to_string(),
                mesh.bone_influences.len().to_string(),
            ],
        );
    }
    table.printstd();

    if detailed {
        for mesh in &summary.meshes {
            println!();
            println!("Submeshes of '{}':", mesh.name);
            let mut table = create_table(&[
                "Submesh",
                "Material",
                "Start Index",
                "Index Count",
                "Vertex Offset",
            ]);
            for submesh in &mesh.submeshes {
                add_table_row(
                    &mut table,
                    vec![
                        submesh.name.clone(),
                        submesh.material_index.to_string(),
                        submesh.start_index.to_string(),
                        submesh.index_count.to_string(),
                        submesh.vertex_offset.to_string(),
                    ],
                );
            }
            table.printstd();
        }

        if !model.bones.is_empty() {
            println!();
            let mut table = create_table(&["#", "Bone", "Parent"]);
            for (index, bone) in model.bones.iter().enumerate() {
                let parent = bone
                    .parent
                    .and_then(|p| model.bones.get(p as usize))
                    .map_or_else(|| "-".to_string(), |p| p.name.clone());
                add_table_row(
                    &mut table,
                    vec![index.to_string(), bone.name.clone(), parent],
                );
            }
            table.printstd();
        }
    }

    Ok(())
}

/// Bone `index` and its descendants. Children are only followed forward in
/// the bone list, so a corrupt parent link cannot loop.
fn bone_node(model: &Model, index: usize) -> TreeNode {
    let node = TreeNode::new(model.bones[index].name.clone(), NodeType::Bone)
        .with_metadata("index", index);
    model
        .bone_children(Some(index as u32))
        .filter(|&child| child > index)
        .fold(node, |node, child| node.add_child(bone_node(model, child)))
}

fn mesh_node(mesh: &Mesh) -> TreeNode {
    let vertex_bytes = mesh.vertex_count() as u64 * u64::from(mesh.vertices.vertex_size());
    let index_bytes = mesh.index_count() as u64 * u64::from(INDEX_SIZE);

    let mut node = TreeNode::new(mesh.name.clone(), NodeType::Mesh)
        .with_metadata("skinned", mesh.is_skinned())
        .with_metadata("triangles", mesh.triangle_count());
    for submesh in &mesh.submeshes {
        node = node.add_child(
            TreeNode::new(submesh.name.clone(), NodeType::Submesh)
                .with_metadata("material", submesh.material_index)
                .with_metadata("start", submesh.start_index)
                .with_metadata("count", submesh.index_count)
                .with_metadata("offset", submesh.vertex_offset),
        );
    }
    node.add_child(
        TreeNode::new("Index Buffer", NodeType::Buffer)
            .with_size(index_bytes)
            .with_metadata("count", mesh.index_count()),
    )
    .add_child(
        TreeNode::new("Vertex Buffer", NodeType::Buffer)
            .with_size(vertex_bytes)
            .with_metadata("count", mesh.vertex_count())
            .with_metadata("stride", mesh.vertices.vertex_size()),
    )
}

fn handle_tree(file: &Path, depth: Option<usize>, no_color: bool, compact: bool) -> Result<()> {
    let model = load_model(file)?;
    let file_size = std::fs::metadata(file)?.len();

    let file_name = file
        .file_name()
        .map_or_else(|| model.name.clone(), |n| n.to_string_lossy().into_owned());

    let skeleton = model
        .bone_children(None)
        .fold(
            TreeNode::new("Skeleton", NodeType::Header).with_metadata("bones", model.num_bones()),
            |node, root| node.add_child(bone_node(&model, root)),
        );
    let meshes = model.meshes.iter().fold(
        TreeNode::new("Meshes", NodeType::Header).with_metadata("count", model.num_meshes()),
        |node, mesh| node.add_child(mesh_node(mesh)),
    );

    let root = TreeNode::new(file_name, NodeType::Root)
        .with_size(file_size)
        .with_metadata("name", &model.name)
        .add_child(skeleton)
        .add_child(meshes);

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        compact,
        ..TreeOptions::default()
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn handle_validate(file: &Path) -> Result<()> {
    println!("Validating model file: {}", file.display());

    let model = match Model::load(file, MaterialRef::default()) {
        Ok(model) => model,
        Err(e) => {
            println!("✗ Failed to load model file: {e}");
            return Err(e.into());
        }
    };

    let report = validate_model(&model);
    print_report(&report.errors, &report.warnings);

    if report.has_errors() {
        anyhow::bail!(
            "Model validation failed with {} error(s)",
            report.error_count()
        )
    }
    if report.has_warnings() {
        println!("\n✓ Model file is valid with warnings");
    } else {
        println!("✓ Model file is valid");
    }
    Ok(())
}

/// Prints the errors and warnings of a validation report.
pub(crate) fn print_report<E: std::fmt::Display, W: std::fmt::Display>(
    errors: &[E],
    warnings: &[W],
) {
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in errors {
            println!("  ✗ {error}");
        }
    }
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("  ⚠ {warning}");
        }
    }
}
