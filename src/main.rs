use clap::Parser;
use env_logger::Env;
use log::warn;
use slab_optics::{
    beam_offset::compute_beam_offset_with_layout,
    console::{beam_report, color_report, focus_report, Args, PartialArgs, Task},
    error::SlabResult,
    focus_shift::compute_focus_shift_with_layout,
    layout::CanvasLayout,
    render::{render_to_file, Scene},
};
use std::path::Path;

fn read_layout(path: Option<&Path>) -> SlabResult<CanvasLayout> {
    path.map_or_else(|| Ok(CanvasLayout::default()), CanvasLayout::from_file)
}

fn plot(scene: &Scene<'_>, path: Option<&Path>, layout: &CanvasLayout) -> SlabResult<()> {
    if let Some(path) = path {
        render_to_file(scene, path, layout)?;
    }
    Ok(())
}

fn main() -> SlabResult<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    //parse CLI arguments and ask for missing values
    let args = Args::try_from(PartialArgs::parse())?;
    let layout = read_layout(args.layout.as_deref())?;
    let plot_path = args.plot.as_deref();

    match &args.task {
        Task::Offset(input) => {
            let result = compute_beam_offset_with_layout(input, &layout);
            println!("{}", beam_report(&result));
            // invalid input clears the drawing
            let scene = result.as_ref().map_or(Scene::Blank, Scene::Beam);
            plot(&scene, plot_path, &layout)
        }
        Task::Focus(input) => {
            let result = compute_focus_shift_with_layout(input, &layout);
            println!("{}", focus_report(&result));
            let scene = result.as_ref().map_or(Scene::Blank, Scene::Focus);
            plot(&scene, plot_path, &layout)
        }
        Task::Color(wavelength_nm) => {
            println!("{}", color_report(*wavelength_nm));
            if plot_path.is_some() {
                warn!("The color calculator does not create a drawing.");
            }
            Ok(())
        }
    }
}
