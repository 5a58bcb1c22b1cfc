use docopt::Docopt;
use log::{info, warn};
use serde_derive::Deserialize;
use mazes::{
    generators::{self, CorridorBias, GrowingTreeConfig},
    grid::Grid,
    grid_displays::{GridText, PathDisplay, StartEndPointsDisplay},
    pathing::Distances,
    session::{MazeSession, SessionSettings},
    solvers::AStar,
    units::{Height, Width},
};
use std::{
    io,
    io::prelude::*,
    fs::File,
    thread,
    time::Duration,
};

const USAGE: &str = "Growing tree mazes

Usage:
    maze_driver -h | --help
    maze_driver [options]

Options:
    -h --help              Show this screen.
    --grid-size=<n>        The grid size is n * n.
    --grid-width=<w>       The grid width in a w*h grid [default: 20].
    --grid-height=<h>      The grid height in a w*h grid [default: 20].
    --seed=<s>             Seed the random number generator for a reproducible maze.
    --corridor-bias=<b>    Chance in [0, 1] of growing from the newest cell rather than a random one [default: 0.8].
    --block-passages=<n>   Randomly choose n passages to wall up again after carving.
    --show-distances       Show the distance from the start point to all other points instead of the path.
    --text-out=<path>      Output file path for a textual rendering of a maze.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
    --animate              Show the maze being carved and solved step by step in the terminal.
    --tick-millis=<ms>     Pause between animation steps [default: 20].
    --mazes=<n>            Number of mazes to animate before exiting [default: 1].
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_size: Option<usize>,
    flag_grid_width: usize,
    flag_grid_height: usize,
    flag_seed: Option<u64>,
    flag_corridor_bias: f64,
    flag_block_passages: Option<usize>,
    flag_show_distances: bool,
    flag_text_out: String,
    flag_save_edges: String,
    flag_animate: bool,
    flag_tick_millis: u64,
    flag_mazes: u64,
}

// We'll put our errors in an `errors` module, and other modules in
// this crate will `use errors::*;` to get access to everything
// `error_chain!` creates.
mod errors {
    use error_chain::*;
    error_chain! {

        links {
            Maze(::mazes::errors::Error, ::mazes::errors::ErrorKind);
        }

        foreign_links {
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // --help and usage mistakes print the usage text and exit here
    let args = parse_args(std::env::args()).unwrap_or_else(|e| e.exit());

    let (width, height) = if let Some(square_grid_size) = args.flag_grid_size {
        (square_grid_size, square_grid_size)
    } else {
        (args.flag_grid_width, args.flag_grid_height)
    };
    let corridor_bias = CorridorBias::new(args.flag_corridor_bias)?;

    if args.flag_animate {
        let settings = SessionSettings {
            width,
            height,
            seed: args.flag_seed,
            corridor_bias,
            ..Default::default()
        };
        return animate(settings, &args);
    }

    let grid = Grid::new(Width(width), Height(height))?;
    let mut maze_grid = generators::growing_tree(grid, GrowingTreeConfig {
        seed: args.flag_seed,
        corridor_bias,
    });
    info!("Generated a {}x{} maze, {} passages", width, height, maze_grid.links_count());

    if let Some(wall_count) = args.flag_block_passages {

        generators::block_random_passages(&mut maze_grid, wall_count, args.flag_seed);
    }

    if !args.flag_save_edges.is_empty() {

        save_maze_graph(&maze_grid, &args.flag_save_edges)?;
    }

    let maze_text = if args.flag_show_distances {
        let distances = Distances::for_grid(&maze_grid, maze_grid.start())
            .ok_or("Invalid start coordinate from which to show path distances.")?;
        GridText::with_display(&maze_grid, &distances).to_string()
    } else {
        render_solution(maze_grid)?
    };

    if args.flag_text_out.is_empty() {
        println!("{}", maze_text);
    } else {
        write_text_to_file(&maze_text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn parse_args<I, S>(argv: I) -> ::std::result::Result<MazeArgs, docopt::Error>
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    Docopt::new(USAGE).and_then(|d| d.argv(argv).deserialize())
}

/// Solve the maze and show the path, or just the start and end points when the end cannot be reached.
fn render_solution(maze_grid: Grid) -> Result<String> {
    let mut solver = AStar::new(maze_grid)?;
    let path = solver.solve()?;
    let grid = solver.grid();

    let text = if path.is_empty() {
        warn!("No route from {:?} to {:?}", grid.start(), grid.end());
        GridText::with_display(grid, &StartEndPointsDisplay::for_grid(grid)).to_string()
    } else {
        info!("Route of {} cells found after {} expansions", path.len(), solver.expanded_count());
        GridText::with_display(grid, &PathDisplay::new(&path)).to_string()
    };
    Ok(text)
}

/// Tick the session and redraw it in the terminal until enough mazes have been shown.
fn animate(settings: SessionSettings, maze_args: &MazeArgs) -> Result<()> {
    const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

    let mut session = MazeSession::new(settings)?;
    let tick_pause = Duration::from_millis(maze_args.flag_tick_millis);
    let mazes_to_show = maze_args.flag_mazes.max(1);
    let stdout = io::stdout();

    while session.mazes_completed() < mazes_to_show {
        session.tick()?;

        let frame = GridText::with_display(session.grid(), &session).to_string();
        let mut handle = stdout.lock();
        write!(handle, "{}{}", CLEAR_SCREEN, frame)?;
        writeln!(handle, "maze {} {:?}", session.mazes_completed() + 1, session.phase())?;
        handle.flush()?;

        thread::sleep(tick_pause);
    }

    Ok(())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze_grid: &Grid, file_path: &str) -> Result<()> {

    let mut graph_data = String::new();
    graph_data.push_str(&format!("{} {}\n", maze_grid.size(), maze_grid.links_count()));

    for (src, dst) in maze_grid.iter_links() {
        let indices = maze_grid
            .grid_coordinate_to_index(src)
            .and_then(|a| maze_grid.grid_coordinate_to_index(dst).map(|b| (a, b)));
        if let Some((index_a, index_b)) = indices {
            graph_data.push_str(&format!("{} {}\n", index_a + 1, index_b + 1));
        }
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
