use std::{env, path::Path, process};

use slotbake::{
    ResultExt,
    bake::{bake_slot, load_slot_asset, optimize_slot_asset, save_slot_asset},
    init_logging,
    library::{SlotLibrary, load_slot_library, save_slot_library},
    project::{ProjectSettings, load_project_settings},
};

const USAGE: &str = "Usage:
  slotbake bake <input.glb> <slot_name> [settings.json]
  slotbake optimize <slot.json>
  slotbake library <library.json> <slot_dir> [settings.json]";

fn main() {
    init_logging();
    if let Err(err) = run().log_error(None) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["bake", input, slot_name, rest @ ..] if rest.len() <= 1 => {
            let settings = settings_from(rest.first())?;
            let report = bake_slot(Path::new(input), slot_name, &settings)?;

            println!("Slot: {}", report.slot_name);
            println!("Mesh: {}", report.mesh_name);
            println!(
                "Bones: {} -> {}",
                report.original_bone_count, report.used_bone_count
            );
            println!(
                "Vertices: {}, Triangles: {}, Sub-meshes: {}",
                report.vertex_count, report.triangle_count, report.submesh_count
            );
            println!("Written: {}", report.slot_path.display());
        }
        ["optimize", slot_path] => {
            let path = Path::new(slot_path);
            let mut slot = load_slot_asset(path)?;
            match optimize_slot_asset(&mut slot)? {
                Some(reduction) => {
                    save_slot_asset(path, &slot)?;
                    println!(
                        "Bones: {} -> {}",
                        reduction.original_bone_count, reduction.used_bone_count
                    );
                }
                None => println!("Slot {} already uses every bone", slot.slot_name),
            }
        }
        ["library", library_path, slot_dir, rest @ ..] if rest.len() <= 1 => {
            let settings = settings_from(rest.first())?;
            let library_path = Path::new(library_path);
            let mut library = if library_path.exists() {
                load_slot_library(library_path)?
            } else {
                SlotLibrary::new()
            };

            let added = library.add_from_directory(Path::new(slot_dir))?;
            let removed = library.remove_invalid();
            library.order_by_name();
            let fixed = library.validate_texture_name_lists(&settings.default_texture_names);
            save_slot_library(library_path, &library)?;

            println!("Added: {added}, Removed empty: {removed}");
            println!("Fixed texture lists: {}", fixed.len());
            println!("Slots: {}", library.len());
        }
        _ => {
            eprintln!("{USAGE}");
            process::exit(2);
        }
    }

    Ok(())
}

fn settings_from(path: Option<&&str>) -> anyhow::Result<ProjectSettings> {
    match path {
        Some(path) => load_project_settings(Path::new(path)),
        None => Ok(ProjectSettings::default()),
    }
}
