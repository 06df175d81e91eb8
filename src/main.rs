use std::io::{self, IsTerminal};

use clap::Parser;
use cmouse::Dims;
use tmouse::{
    app::{App, AppError},
    logging,
    renderer::GBuffer,
    settings::Settings,
    simulation::Simulation,
    view,
};

#[derive(Parser, Debug)]
#[clap(version, author, about, name = "tmouse")]
struct Args {
    #[clap(long, help = "Maze width in cells")]
    width: Option<usize>,
    #[clap(long, help = "Maze height in cells")]
    height: Option<usize>,
    #[clap(long, help = "Seed of the maze generator")]
    seed: Option<u64>,
    #[clap(long, help = "Simulation speed in frames per second")]
    fps: Option<u32>,
    #[clap(short, long, action, help = "Print the solved maze and quit")]
    print: bool,
    #[clap(short, long, action, help = "Reset config to default and quit")]
    reset_config: bool,
    #[clap(short, long, action, help = "Show config path and quit")]
    show_config_path: bool,
    #[clap(long, help = "Show config in debug format and quit")]
    debug_config: bool,
}

impl Args {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(width) = self.width {
            settings = settings.set_maze_width(width);
        }
        if let Some(height) = self.height {
            settings = settings.set_maze_height(height);
        }
        if self.seed.is_some() {
            settings = settings.set_seed(self.seed);
        }
        if let Some(fps) = self.fps {
            settings = settings.set_fps(fps);
        }
        settings
    }
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    if args.reset_config {
        Settings::reset_config(Settings::default_path())?;
        return Ok(());
    }

    if args.show_config_path {
        let settings_path = Settings::default_path();
        if let Some(s) = settings_path.to_str() {
            println!("{}", s);
        } else {
            println!("{:?}", settings_path);
        }
        return Ok(());
    }

    if args.debug_config {
        println!("{:#?}", Settings::load(Settings::default_path())?);
        return Ok(());
    }

    let settings = args.apply(Settings::load(Settings::default_path())?);

    if args.print {
        return print_solved(&settings);
    }

    better_panic::install();
    // only fails when a logger is already installed
    let _ = logging::init();

    App::new(&settings)?.run()
}

fn print_solved(settings: &Settings) -> Result<(), AppError> {
    let mut sim = Simulation::new(settings)?;
    sim.solve()?;

    let mut frame = GBuffer::new(view::maze_size(&sim));
    view::draw_maze(&mut frame, Dims::ZERO, &sim, &settings.get_color_scheme(), false);

    let stdout = io::stdout();
    let colored = stdout.is_terminal();
    frame.write(&mut stdout.lock(), colored)?;

    let explored = sim.state.explored.len();
    match sim.mouse.search().and_then(|search| search.path_len()) {
        Some(moves) => println!("{moves} moves, {explored} cells explored"),
        None => println!("no path, {explored} cells explored"),
    }
    Ok(())
}
