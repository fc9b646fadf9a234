use std::{
    fmt,
    io::{self, BufRead, Write},
    sync::Arc,
};

use clap::{App, Arg, ArgMatches};
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;
use tokio::sync::watch;

use broadside::{
    engine::generate_layout,
    ships::fleet_for,
    AbilityKind, ActionReport, Axis, BoardSetup, Coordinate, Difficulty, FleetPlacement,
    GameError, MoveKind, MoveOutcome, MoveRecord, OpponentEngine, Player, Quadrant, RoomConfig,
    RoomHandle, RoomId, RoomRegistry, RoomSnapshot, ShipClass, ShipSpot, ShotMark,
};

/// The ability kit both sides start with. Three kinds keeps the whole kit
/// grantable under the active-common cap.
const DEFAULT_KIT: [AbilityKind; 3] = [AbilityKind::Nuke, AbilityKind::Annihilate, AbilityKind::Jam];

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let matches = App::new("Broadside")
        .version("0.1")
        .about("Grid combat with abilities against an automated opponent.")
        .arg(
            Arg::with_name("first_player")
                .short("f")
                .long("first-player")
                .value_name("FIRST_PLAYER")
                .help("pre-specify which player goes first")
                .takes_value(true)
                .possible_values(&["human", "me", "computer", "bot", "random", "rand"])
                .case_insensitive(true),
        )
        .arg(
            Arg::with_name("size")
                .short("s")
                .long("size")
                .value_name("SIZE")
                .help("board side length, 6 to 12")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("difficulty")
                .short("d")
                .long("difficulty")
                .value_name("DIFFICULTY")
                .help("strength of the automated opponent")
                .takes_value(true)
                .possible_values(&["easy", "medium", "hard"])
                .case_insensitive(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("seed for all random choices, for reproducible games")
                .takes_value(true),
        )
        .get_matches();

    let config = parse_config(&matches);
    let difficulty = matches
        .value_of("difficulty")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(Difficulty::Medium);

    let stdin = io::stdin();
    let mut input = InputReader::new(stdin.lock());
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let human = choose_player(&matches, &mut input, &mut rng)?;
    let bot = human.opponent();

    let plan = choose_placements(config.board_size, &mut rng, &mut input)?;
    let bot_plan = generate_layout(config.board_size, difficulty.placement_bias(), &mut rng);

    let registry = RoomRegistry::new();
    let id = RoomId::from("local");
    let (p1_plan, p2_plan) = match human {
        Player::P1 => (&plan, &bot_plan),
        Player::P2 => (&bot_plan, &plan),
    };
    let handle = registry
        .create(id, config, p1_plan, p2_plan, Player::P1)
        .expect("fresh registry cannot already hold the room");

    for &kind in &DEFAULT_KIT {
        handle.grant(human, kind).expect("kit fits under the cap");
        handle.grant(bot, kind).expect("kit fits under the cap");
    }

    let mut engine = OpponentEngine::new(Arc::clone(&handle), bot, difficulty);
    if let Some(seed) = config.seed {
        engine = engine.with_seed(seed.wrapping_add(1));
    }
    tokio::spawn(engine.run());

    play(&handle, human, &plan, &mut input).await?;
    Ok(())
}

fn parse_config(matches: &ArgMatches) -> RoomConfig {
    let size = matches
        .value_of("size")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(10);
    let mut config = RoomConfig::new(size).unwrap_or_else(|| {
        println!("size {} out of range, using 10", size);
        RoomConfig::default()
    });
    if let Some(seed) = matches.value_of("seed").and_then(|raw| raw.parse().ok()) {
        config = config.with_seed(seed);
    }
    config
}

/// Choose which [`Player`] is the human based on either args or cli input.
fn choose_player<B: BufRead>(
    matches: &ArgMatches,
    input: &mut InputReader<B>,
    rng: &mut impl Rng,
) -> io::Result<Player> {
    Ok(if let Some(choice) = matches.value_of("first_player") {
        match choice.to_ascii_lowercase().as_str() {
            "human" | "me" => Player::P1,
            "computer" | "bot" => Player::P2,
            "random" | "rand" => {
                if rng.gen_bool(0.5) {
                    Player::P1
                } else {
                    Player::P2
                }
            }
            _ => unreachable!(),
        }
    } else {
        input.read_input_lower("Do you want to go first? (Y/n)", |input| match input {
            "yes" | "y" | "first" | "1" | "1st" | "" => Some(Player::P1),
            "no" | "n" | "second" | "2" | "2nd" => Some(Player::P2),
            _ => {
                println!("Invalid selection.");
                None
            }
        })?
    })
}

/// Collect ship placements from the player.
fn choose_placements<B: BufRead>(
    size: usize,
    rng: &mut impl Rng,
    input: &mut InputReader<B>,
) -> io::Result<FleetPlacement> {
    enum Command {
        Done,
        Place(ShipSpot),
        Unplace(ShipClass),
        Clear,
        RandomizeRest,
        Help,
    }
    let mut setup = BoardSetup::new(size);
    println!();
    println!("Place ships. Type help or ? for commands.");
    loop {
        println!();
        static PLACE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"^(?x)(?:place|put)\s+
        (?P<ship>\w+)\s+
        (?:(?:at|on|to|->|=>)\s+)?
        (?P<row>[0-9]+)(?:\s*,\s*|\s+)(?P<col>[0-9]+)\s+
        (?P<dir>\w+)$",
            )
            .unwrap()
        });
        static UNPLACE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^(?x)(?:un-?place|remove)\s+(?P<ship>\w+)$").unwrap());

        if setup.ready() {
            println!("All ships placed, type done to start the game");
        } else {
            let names: Vec<&str> = setup.pending_ships().map(ShipClass::name).collect();
            println!("Remaining ships to place: {}", names.join(", "));
        }
        println!("Your current board setup:");
        show_setup_board(&setup);
        println!();

        let cmd = input.read_input_lower("> ", |raw| match raw {
            "?" | "help" | "h" => Some(Command::Help),
            "randomize" | "rand" | "random" => Some(Command::RandomizeRest),
            "done" | "start" => Some(Command::Done),
            "clear" => Some(Command::Clear),
            other => {
                if let Some(captures) = PLACE.captures(other) {
                    let class = match parse_ship(captures.name("ship").unwrap().as_str()) {
                        Some(class) => class,
                        None => return None,
                    };
                    let row = match parse_index(captures.name("row").unwrap().as_str(), size) {
                        Some(row) => row,
                        None => return None,
                    };
                    let col = match parse_index(captures.name("col").unwrap().as_str(), size) {
                        Some(col) => col,
                        None => return None,
                    };
                    let axis = match captures.name("dir").unwrap().as_str() {
                        "h" | "horizontal" | "right" | "east" => Axis::Horizontal,
                        "v" | "vertical" | "down" | "south" => Axis::Vertical,
                        other => {
                            println!(
                                "invalid direction {}, choose \"horizontal\" or \"vertical\"",
                                other
                            );
                            return None;
                        }
                    };
                    Some(Command::Place(ShipSpot {
                        class,
                        bow: Coordinate::new(row, col),
                        axis,
                    }))
                } else if let Some(captures) = UNPLACE.captures(other) {
                    match captures.name("ship").unwrap().as_str() {
                        "all" => Some(Command::Clear),
                        name => parse_ship(name).map(Command::Unplace),
                    }
                } else {
                    println!("Invalid ship-placement command {:?}. Use '?' for help", other);
                    None
                }
            }
        })?;

        match cmd {
            Command::Done if setup.ready() => break,
            Command::Done => println!("You must place all your ships first!"),
            Command::Place(spot) => {
                if setup.placement(spot.class).is_some() {
                    setup.unplace(spot.class);
                }
                if let Err(err) = setup.place(spot) {
                    println!("Invalid placement: {}", err);
                }
            }
            Command::Unplace(class) => {
                setup.unplace(class);
            }
            Command::Clear => {
                for &class in fleet_for(size) {
                    setup.unplace(class);
                }
            }
            Command::RandomizeRest => randomize_rest(&mut setup, size, rng),
            Command::Help => {
                println!(
                    "Available Commands:
    done                          if all ships are placed, start the game.
    place <ship> <row>,<col> <dir> place the ship at the coordinate along the direction.
        Directions are \"horizontal\" (h) and \"vertical\" (v). See below for ships.
    unplace <ship>                clear the placement of the specified ship.
        \"unplace all\" clears every placement.
    clear                         clears all ship placements.
    randomize                     randomize the placements of the remaining ships."
                );
                println!("Available Ships: {}", ship_help(size));
            }
        }
    }

    let ships = fleet_for(size)
        .iter()
        .map(|&class| {
            let cells = setup.placement(class).expect("ready setup missing a ship");
            let bow = cells[0];
            let axis = if cells.len() > 1 && cells[1].row == bow.row {
                Axis::Horizontal
            } else {
                Axis::Vertical
            };
            ShipSpot { class, bow, axis }
        })
        .collect();
    Ok(FleetPlacement::new(ships))
}

/// Randomly place every ship still pending.
fn randomize_rest(setup: &mut BoardSetup, size: usize, rng: &mut impl Rng) {
    let pending: Vec<ShipClass> = setup.pending_ships().collect();
    for class in pending {
        for _ in 0..256 {
            let spot = ShipSpot {
                class,
                bow: Coordinate::new(rng.gen_range(0, size), rng.gen_range(0, size)),
                axis: if rng.gen_bool(0.5) {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                },
            };
            if setup.place(spot).is_ok() {
                break;
            }
        }
    }
}

/// The interactive game loop. The engine runs as its own task; this loop
/// prompts whenever the turn token comes back to the human.
async fn play<B: BufRead>(
    handle: &Arc<RoomHandle>,
    human: Player,
    plan: &FleetPlacement,
    input: &mut InputReader<B>,
) -> io::Result<()> {
    enum Command {
        Attack(Coordinate),
        Nuke(Coordinate),
        Annihilate(Coordinate, Axis),
        QuadrantWipe(Quadrant),
        Hacker,
        Scanner(Coordinate),
        Jam,
        Counter,
        Show,
        Help,
        Surrender,
    }
    static TARGETED: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?x)(?P<cmd>attack|fire|shoot|nuke|scan|scanner)\s+
        (?P<row>[0-9]+)(?:\s*,\s*|\s+)(?P<col>[0-9]+)$",
        )
        .unwrap()
    });
    static ANNIHILATE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(?x)annihilate\s+
        (?P<row>[0-9]+)(?:\s*,\s*|\s+)(?P<col>[0-9]+)\s+
        (?P<axis>\w+)$",
        )
        .unwrap()
    });
    static QUADRANT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?x)(?:quadrant|wipe)\s+(?P<quad>\w+)$").unwrap());

    let mut updates = handle.subscribe();
    let mut seen_moves = 0usize;
    loop {
        let snap = wait_for_turn(&mut updates, human).await;
        seen_moves = report_new_moves(&snap, human, seen_moves);
        if let Some(verdict) = snap.verdict {
            if verdict.winner == human {
                println!("You win!");
            } else {
                println!("You lose.");
            }
            println!("The opponent's fleet:");
            show_final_board(handle, human.opponent());
            return Ok(());
        }

        println!();
        println!("Your board:");
        show_own_board(&snap, human, plan);
        println!("Opponent's board:");
        show_enemy_board(&snap, human.opponent());
        show_kit(&snap, human);

        let size = snap.size;
        let cmd = input.read_input_lower("> ", |raw| match raw {
            "?" | "help" => Some(Command::Help),
            "board" | "show" => Some(Command::Show),
            "hacker" | "reveal" => Some(Command::Hacker),
            "jam" => Some(Command::Jam),
            "counter" => Some(Command::Counter),
            "surrender" | "quit" | "concede" => Some(Command::Surrender),
            other => {
                if let Some(captures) = TARGETED.captures(other) {
                    let row = parse_index(captures.name("row").unwrap().as_str(), size)?;
                    let col = parse_index(captures.name("col").unwrap().as_str(), size)?;
                    let coord = Coordinate::new(row, col);
                    match captures.name("cmd").unwrap().as_str() {
                        "nuke" => Some(Command::Nuke(coord)),
                        "scan" | "scanner" => Some(Command::Scanner(coord)),
                        _ => Some(Command::Attack(coord)),
                    }
                } else if let Some(captures) = ANNIHILATE.captures(other) {
                    let row = parse_index(captures.name("row").unwrap().as_str(), size)?;
                    let col = parse_index(captures.name("col").unwrap().as_str(), size)?;
                    let axis = match captures.name("axis").unwrap().as_str() {
                        "h" | "horizontal" => Axis::Horizontal,
                        "v" | "vertical" => Axis::Vertical,
                        other => {
                            println!("invalid axis {:?}, choose h or v", other);
                            return None;
                        }
                    };
                    Some(Command::Annihilate(Coordinate::new(row, col), axis))
                } else if let Some(captures) = QUADRANT.captures(other) {
                    let quad = match captures.name("quad").unwrap().as_str() {
                        "nw" => Quadrant::NorthWest,
                        "ne" => Quadrant::NorthEast,
                        "sw" => Quadrant::SouthWest,
                        "se" => Quadrant::SouthEast,
                        other => {
                            println!("invalid quadrant {:?}, choose nw, ne, sw, or se", other);
                            return None;
                        }
                    };
                    Some(Command::QuadrantWipe(quad))
                } else {
                    println!("Unknown command {:?}. Use '?' for help", other);
                    None
                }
            }
        })?;

        let result = match cmd {
            Command::Attack(coord) => report_action(handle.attack(human, coord)),
            Command::Nuke(coord) => report_action(handle.fire_nuke(human, coord)),
            Command::Annihilate(coord, axis) => {
                report_action(handle.fire_annihilate(human, coord, axis))
            }
            Command::QuadrantWipe(quad) => report_action(handle.fire_quadrant(human, quad)),
            Command::Hacker => match handle.hacker(human) {
                Ok(reveal) => {
                    match reveal.cell {
                        Some(cell) => println!("Intel: enemy ship segment at {}.", cell),
                        None => println!("Intel: nothing left to reveal."),
                    }
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Command::Scanner(coord) => match handle.scanner(human, coord) {
                Ok(scan) => {
                    println!("Scanner: {} ship cell(s) in the 2x2 block.", scan.ships);
                    Ok(())
                }
                Err(err) => Err(err),
            },
            Command::Jam => handle.install_jam(human).map(|()| {
                println!("Jam armed: the next incoming attack will be absorbed.");
            }),
            Command::Counter => handle.install_counter(human).map(|()| {
                println!("Counter armed: the next hit you take will be repaid.");
            }),
            Command::Show => Ok(()),
            Command::Help => {
                print_game_help();
                Ok(())
            }
            Command::Surrender => {
                let _ = handle.surrender(human);
                Ok(())
            }
        };
        if let Err(err) = result {
            println!("Rejected: {}", err);
        }
    }
}

fn report_action(result: Result<ActionReport, GameError>) -> Result<(), GameError> {
    match result? {
        ActionReport::Intercepted => {
            println!("Your attack was jammed! The opponent keeps the initiative.");
        }
        ActionReport::Resolved(salvo) => {
            for shot in &salvo.shots {
                match shot.result.ship() {
                    Some(class) => println!("{}: hit a {}!", shot.coord, class.name()),
                    None => println!("{}: miss.", shot.coord),
                }
            }
            if let Some(counter) = salvo.counter {
                println!(
                    "Counterattack! Your ship at {} takes a retaliatory hit.",
                    counter.coord
                );
            }
        }
    }
    Ok(())
}

/// Wait until it is the human's turn or the game is over.
async fn wait_for_turn(
    updates: &mut watch::Receiver<RoomSnapshot>,
    human: Player,
) -> RoomSnapshot {
    loop {
        let snap = updates.borrow_and_update().clone();
        if snap.over() || snap.turn == human {
            return snap;
        }
        if updates.changed().await.is_err() {
            return snap;
        }
    }
}

/// Print any moves the opponent made since the last report. Returns the new
/// count of seen moves.
fn report_new_moves(snap: &RoomSnapshot, human: Player, seen: usize) -> usize {
    for record in snap.moves.iter().skip(seen) {
        if record.actor != human {
            println!("{}", describe_move(record));
        } else if record.kind == MoveKind::CounterStrike {
            match record.coords.first() {
                Some(coord) => println!("Your counter retaliates at {}.", coord),
                None => println!("Your counter retaliates."),
            }
        }
    }
    snap.moves.len()
}

fn describe_move(record: &MoveRecord) -> String {
    let verb = match record.kind {
        MoveKind::Attack => "attacks",
        MoveKind::Nuke => "fires a nuke at",
        MoveKind::Annihilate => "fires an annihilator at",
        MoveKind::Quadrant => "wipes a quadrant",
        MoveKind::Hacker => "runs a reveal",
        MoveKind::Scanner => "scans",
        MoveKind::JamInstall => "arms a jammer",
        MoveKind::CounterInstall => "arms a counter",
        MoveKind::CounterStrike => "retaliates at",
        MoveKind::Intercepted => "is jammed attacking",
        MoveKind::Surrender => "surrenders",
    };
    let at = record
        .coords
        .first()
        .map(|coord| format!(" {}", coord))
        .unwrap_or_default();
    let outcome = match &record.outcome {
        MoveOutcome::Shots { hits, misses } => {
            format!(" ({} hit, {} miss)", hits.len(), misses.len())
        }
        MoveOutcome::Scan { ships } => format!(" ({} ship cells)", ships),
        _ => String::new(),
    };
    format!("Opponent {}{}{}.", verb, at, outcome)
}

fn show_kit(snap: &RoomSnapshot, human: Player) {
    let ready: Vec<&str> = snap
        .side(human)
        .abilities
        .iter()
        .filter(|view| view.state.ready())
        .map(|view| view.kind.label())
        .collect();
    if !ready.is_empty() {
        println!("Abilities ready: {}", ready.join(", "));
    }
}

fn print_game_help() {
    println!(
        "Available Commands:
    attack <row>,<col>           fire at the opponent's grid.
    nuke <row>,<col>             spend NUKE: the cell plus its diagonals.
    annihilate <row>,<col> <h|v> spend ANNIHILATE: the cell plus both sides.
    scanner <row>,<col>          spend SCANNER: count ships in a 2x2 block.
    hacker                       spend HACKER: reveal one enemy ship cell.
    jam                          arm the jammer passive.
    counter                      arm the counter passive.
    quadrant <nw|ne|sw|se>       spend the quadrant wipe (moderated rooms).
    board                        reprint the boards.
    surrender                    concede the game."
    );
}

fn parse_ship(name: &str) -> Option<ShipClass> {
    let class = match name {
        "cv" | "carrier" => ShipClass::Carrier,
        "bb" | "battleship" => ShipClass::Battleship,
        "ca" | "cl" | "cruiser" => ShipClass::Cruiser,
        "ss" | "sub" | "submarine" => ShipClass::Submarine,
        "dd" | "destroyer" => ShipClass::Destroyer,
        other => {
            println!("invalid ship: {}", other);
            return None;
        }
    };
    Some(class)
}

fn parse_index(raw: &str, size: usize) -> Option<usize> {
    match raw.parse::<usize>() {
        Ok(value) if value < size => Some(value),
        Ok(value) => {
            println!("{} is out of range [0,{}]", value, size - 1);
            None
        }
        Err(_) => {
            println!("invalid number: {}", raw);
            None
        }
    }
}

fn ship_help(size: usize) -> String {
    fleet_for(size)
        .iter()
        .map(|class| format!("\"{}\" ({})", class.name(), class.abbrev()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print out the setup board.
fn show_setup_board(setup: &BoardSetup) {
    let size = setup.size();
    show_board(size, |coord| match setup.ship_at(coord) {
        Some(class) => GridCell::Ship(class),
        None => GridCell::Empty,
    });
}

/// The human's own board: ships from the local plan, marks from the shared
/// snapshot.
fn show_own_board(snap: &RoomSnapshot, human: Player, plan: &FleetPlacement) {
    let view = snap.side(human);
    show_board(snap.size, |coord| {
        let mark = view.cell(coord).and_then(|cell| cell.mark);
        let ship = plan
            .ships
            .iter()
            .find(|spot| spot.cells().any(|c| c == coord))
            .map(|spot| spot.class);
        match (mark, ship) {
            (Some(ShotMark::Hit), Some(class)) => GridCell::Hit(class),
            (Some(ShotMark::Miss), _) => GridCell::Shot,
            (_, Some(class)) => GridCell::Ship(class),
            _ => GridCell::Empty,
        }
    });
}

/// The opponent's board as the human may see it.
fn show_enemy_board(snap: &RoomSnapshot, enemy: Player) {
    let view = snap.side(enemy);
    show_board(snap.size, |coord| {
        let cell = match view.cell(coord) {
            Some(cell) => cell,
            None => return GridCell::Empty,
        };
        match (cell.mark, cell.ship) {
            (Some(ShotMark::Hit), Some(class)) => GridCell::Hit(class),
            (Some(ShotMark::Hit), None) => GridCell::Shot,
            (Some(ShotMark::Miss), _) => GridCell::Shot,
            (None, _) if cell.revealed => match cell.ship {
                Some(class) => GridCell::Ship(class),
                None => GridCell::Empty,
            },
            (None, _) => GridCell::Unknown,
        }
    });
}

/// The opponent's fully revealed board, shown when the game ends.
fn show_final_board(handle: &Arc<RoomHandle>, enemy: Player) {
    handle.with_room(|room| {
        let board = room.board(enemy);
        show_board(board.size(), |coord| {
            let cell = match board.cell(coord) {
                Some(cell) => cell,
                None => return GridCell::Empty,
            };
            match (cell.mark(), cell.ship()) {
                (Some(ShotMark::Hit), Some(class)) => GridCell::Hit(class),
                (_, Some(class)) => GridCell::Ship(class),
                (Some(ShotMark::Miss), None) => GridCell::Shot,
                _ => GridCell::Empty,
            }
        });
    });
}

enum GridCell {
    Empty,
    Unknown,
    Shot,
    Ship(ShipClass),
    Hit(ShipClass),
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GridCell::Empty => f.pad("~~"),
            GridCell::Unknown => f.pad("··"),
            GridCell::Shot => f.pad("x"),
            GridCell::Ship(class) => f.pad(class.abbrev()),
            GridCell::Hit(class) => f.pad(&format!("x{}", class.abbrev())),
        }
    }
}

/// Show a board by printing the grid with row and column headers.
fn show_board(size: usize, cell: impl Fn(Coordinate) -> GridCell) {
    print!("   ");
    for col in 0..size {
        print!("{:^5}", col);
    }
    println!();
    for row in 0..size {
        print!("{:>2} ", row);
        for col in 0..size {
            print!("{:^5}", cell(Coordinate::new(row, col)));
        }
        println!();
    }
}

/// Helper to read input from the player.
struct InputReader<B> {
    read: B,
    buf: String,
}

impl<B> InputReader<B> {
    fn new(read: B) -> Self {
        Self {
            read,
            buf: String::new(),
        }
    }
}

impl<B: BufRead> InputReader<B> {
    /// Repeatedly tries to read input until the checker returns `Some`.
    /// Converts to ascii lower before running the checker.
    fn read_input_lower<F, T>(&mut self, prompt: &str, mut checker: F) -> io::Result<T>
    where
        F: FnMut(&str) -> Option<T>,
    {
        loop {
            self.read_input_inner(prompt)?;
            self.buf.make_ascii_lowercase();
            if let Some(val) = checker(self.buf.trim()) {
                return Ok(val);
            }
        }
    }

    /// Helper to print the prompt, clear the string buffer and read a line.
    fn read_input_inner(&mut self, prompt: &str) -> io::Result<()> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        self.buf.clear();
        if self.read.read_line(&mut self.buf)? == 0 {
            println!();
            std::process::exit(0);
        }
        Ok(())
    }
}
