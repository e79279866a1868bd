use std::{
    fmt,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{App, Arg, ArgMatches};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use robobattleship::{
    board::{Coordinate, SIZE},
    game::{BattleView, BoardView, Fixed, RandomFirstShooter, Side, ViewCell},
    response, Error, Result, Server, Settings,
};

fn main() -> io::Result<()> {
    let matches = App::new("RoboBattleship")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Battleship server console. Reads one command per line, replies in JSON.")
        .arg(
            Arg::with_name("dumps_root")
                .long("dumps-root")
                .value_name("DIR")
                .help("directory state dumps are written to")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("admin_email")
                .long("admin-email")
                .value_name("EMAIL")
                .help("contact named in unexpected error messages")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("restore")
                .long("restore")
                .value_name("FILE")
                .help("load server state from a dump before reading commands")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("first_shooter")
                .short("f")
                .long("first-shooter")
                .value_name("FIRST_SHOOTER")
                .help("pre-specify who shoots first in new battles")
                .takes_value(true)
                .possible_values(&["random", "challenger", "challenged"])
                .case_insensitive(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("log every shot"),
        )
        .get_matches();

    let level = if matches.is_present("verbose") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {}", err);
    }

    let server = build_server(&matches);
    if let Some(path) = matches.value_of("restore") {
        if let Err(err) = server.restore_state(Path::new(path)) {
            print_reply(&response::failure(&err, &server.settings().admin_email))?;
            process::exit(1);
        }
    }
    info!("Server ready, type help for commands");

    let stdin = io::stdin();
    let mut input = InputReader::new(stdin.lock());
    while let Some(line) = input.read_line(">")? {
        if line.is_empty() {
            continue;
        }
        let reply = match Input::parse(line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                print_help();
                continue;
            }
            Ok(Input::Unknown(other)) => {
                println!("Invalid command \"{}\". Use 'help' for help", other);
                continue;
            }
            Ok(Input::Server(command)) => execute(&server, command),
            Err(err) => response::failure(&err, &server.settings().admin_email),
        };
        print_reply(&reply)?;
    }
    Ok(())
}

/// Build the server from the environment and command line flags.
fn build_server(matches: &ArgMatches) -> Server {
    let mut settings = Settings::from_env();
    if let Some(root) = matches.value_of("dumps_root") {
        settings.dumps_root = PathBuf::from(root);
    }
    if let Some(email) = matches.value_of("admin_email") {
        settings.admin_email = email.to_owned();
    }
    match matches
        .value_of("first_shooter")
        .map(|choice| choice.to_ascii_lowercase())
        .as_deref()
    {
        Some("challenger") => Server::new(settings, Fixed(Side::First)),
        Some("challenged") => Server::new(settings, Fixed(Side::Second)),
        _ => Server::new(settings, RandomFirstShooter),
    }
}

/// A single line of console input.
#[derive(Debug, Eq, PartialEq)]
enum Input<'a> {
    /// A request for the server.
    Server(Command<'a>),
    Help,
    Quit,
    Unknown(&'a str),
}

/// A request the console forwards to the server.
#[derive(Debug, Eq, PartialEq)]
enum Command<'a> {
    Register {
        name: &'a str,
    },
    SetShips {
        uid: &'a str,
        secret: &'a str,
        ships: &'a str,
    },
    Shoot {
        uid: &'a str,
        secret: &'a str,
        enemy: &'a str,
        x: i64,
        y: i64,
    },
    Battle {
        id: &'a str,
        viewer: Option<&'a str>,
    },
    Players,
    Dump {
        file_name: Option<&'a str>,
    },
}

impl<'a> Input<'a> {
    /// Parse a trimmed, non-empty line. Missing arguments are reported the same way the
    /// server reports them; extra arguments are ignored.
    fn parse(line: &'a str) -> Result<Self> {
        /// Command word followed by its arguments.
        static COMMAND: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"^(?x)
        (?P<cmd>[[:alpha:]?]+)
        (?:\s+(?P<args>.*))?$",
            )
            .unwrap()
        });

        let captures = match COMMAND.captures(line) {
            Some(captures) => captures,
            None => return Ok(Input::Unknown(line)),
        };
        let cmd = captures.name("cmd").map_or("", |m| m.as_str());
        let rest = captures.name("args").map_or("", |m| m.as_str().trim());
        let mut args = rest.split_whitespace();
        let mut next = || args.next().ok_or(Error::NotEnoughParameters);

        let command = match cmd.to_ascii_lowercase().as_str() {
            "register" => {
                if rest.is_empty() {
                    return Err(Error::NotEnoughParameters);
                }
                Command::Register { name: rest }
            }
            "setships" => Command::SetShips {
                uid: next()?,
                secret: next()?,
                ships: next()?,
            },
            "shoot" => Command::Shoot {
                uid: next()?,
                secret: next()?,
                enemy: next()?,
                x: Coordinate::parse_axis(next()?)?,
                y: Coordinate::parse_axis(next()?)?,
            },
            "battle" => Command::Battle {
                id: next()?,
                viewer: next().ok(),
            },
            "players" => Command::Players,
            "dump" | "dumpstate" => Command::Dump {
                file_name: next().ok(),
            },
            "help" | "h" | "?" => return Ok(Input::Help),
            "quit" | "exit" | "q" => return Ok(Input::Quit),
            _ => return Ok(Input::Unknown(line)),
        };
        Ok(Input::Server(command))
    }
}

/// Run a command against the server and build the reply.
fn execute(server: &Server, command: Command) -> Value {
    let admin_email = &server.settings().admin_email;
    match command {
        Command::Register { name } => response::respond(
            server.register(name).map(|player| json!({ "player": player })),
            admin_email,
        ),
        Command::SetShips { uid, secret, ships } => {
            response::respond(server.submit_ships(uid, secret, ships), admin_email)
        }
        Command::Shoot {
            uid,
            secret,
            enemy,
            x,
            y,
        } => {
            let result = server.shoot(uid, secret, enemy, x, y);
            if let Err(err) = &result {
                if err.is_battle_over() {
                    if let Err(err) = server.archive(uid, enemy) {
                        return response::respond::<()>(Err(err), admin_email);
                    }
                }
            }
            response::respond(
                result.map(|outcome| json!({ "result": outcome })),
                admin_email,
            )
        }
        Command::Players => response::respond(
            server.players().map(|players| {
                let players: Vec<_> = players
                    .iter()
                    .map(|player| json!({ "uid": player.uid(), "name": player.name() }))
                    .collect();
                json!({ "players": players })
            }),
            admin_email,
        ),
        Command::Dump { file_name } => response::respond(
            server
                .dump_state(file_name)
                .map(|path| json!({ "path": path.display().to_string() })),
            admin_email,
        ),
        Command::Battle { id, viewer } => response::respond(
            server.battle(id, viewer).map(|view| {
                show_battle(&view);
                json!({ "battle": view })
            }),
            admin_email,
        ),
    }
}

/// Print both boards of a battle.
fn show_battle(view: &BattleView) {
    for board in view.boards.iter() {
        println!();
        println!("{} ({})", board.name, board.uid);
        show_board(board);
    }
    println!();
}

/// Display helper for a single cell of a board.
struct CellGlyph(ViewCell);

impl fmt::Display for CellGlyph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            ViewCell::Water => f.pad("~~"),
            ViewCell::Ship => f.pad("[]"),
            ViewCell::Hit => f.pad("X"),
            ViewCell::Miss => f.pad("x"),
        }
    }
}

/// Print a board, rows by x and columns by y.
fn show_board(board: &BoardView) {
    print!("   ");
    for i in 0..SIZE {
        print!("{:^4}", i);
    }
    println!();
    for (i, row) in board.cells.iter().enumerate() {
        print!("{:>2} ", i);
        for &cell in row.iter() {
            print!("{:^4}", CellGlyph(cell));
        }
        println!();
    }
}

fn print_reply(reply: &Value) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer(&mut out, reply)?;
    writeln!(out)
}

fn print_help() {
    println!(
        "Available Commands:
    register <name>                           register a new player.
    setships <uid> <secret> <ships>           set your ships: 100 characters of '0' and '1',
        row by row.
    shoot <uid> <secret> <enemy_uid> <x> <y>  shoot at another player. x is the row, y the
        column, both in range [0,9].
    battle <id> [viewer_uid]                  show a battle. Only the viewer's own ships are
        shown.
    players                                   list registered players.
    dump [filename]                           write the server state to the dumps directory.
    help                                      show this message.
    quit                                      exit."
    );
}

/// Helper to read input from the console.
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
    /// Print the prompt, clear the string buffer and read a line. Returns `None` at the end
    /// of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<&str>> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        self.buf.clear();
        if self.read.read_line(&mut self.buf)? == 0 {
            println!();
            return Ok(None);
        }
        Ok(Some(self.buf.trim()))
    }
}

#[cfg(test)]
mod tests {
    use robobattleship::board::{CoordinateError, PLACEMENT_LEN};

    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            Input::parse("register Sir Shoots-a-lot"),
            Ok(Input::Server(Command::Register {
                name: "Sir Shoots-a-lot"
            }))
        );
        assert_eq!(
            Input::parse("SHOOT uid-1 usec-2 uid-3 4 5"),
            Ok(Input::Server(Command::Shoot {
                uid: "uid-1",
                secret: "usec-2",
                enemy: "uid-3",
                x: 4,
                y: 5
            }))
        );
        assert_eq!(
            Input::parse("battle uid-3_vs_uid-1"),
            Ok(Input::Server(Command::Battle {
                id: "uid-3_vs_uid-1",
                viewer: None
            }))
        );
        assert_eq!(
            Input::parse("dump"),
            Ok(Input::Server(Command::Dump { file_name: None }))
        );
        assert_eq!(Input::parse("?"), Ok(Input::Help));
        assert_eq!(Input::parse("Quit"), Ok(Input::Quit));
        assert_eq!(Input::parse("fly away"), Ok(Input::Unknown("fly away")));
    }

    #[test]
    fn reports_bad_arguments() {
        assert_eq!(Input::parse("register"), Err(Error::NotEnoughParameters));
        assert_eq!(
            Input::parse("setships uid-1 usec-2"),
            Err(Error::NotEnoughParameters)
        );
        assert_eq!(
            Input::parse("shoot uid-1 usec-2 uid-3 four 5"),
            Err(CoordinateError::NotInteger {
                value: "four".to_owned()
            }
            .into())
        );
    }

    #[test]
    fn battle_reply_carries_the_view() {
        let server = Server::new(Settings::default(), Fixed(Side::First));
        let anna = server.register("Anna").unwrap();
        let bert = server.register("Bert").unwrap();
        let ships = "1".repeat(PLACEMENT_LEN);
        for player in &[&anna, &bert] {
            server
                .submit_ships(player.uid().as_str(), player.secret(), &ships)
                .unwrap();
        }
        let (a, b) = (anna.uid().as_str(), bert.uid().as_str());
        server.shoot(a, anna.secret(), b, 3, 4).unwrap();

        let id = format!("{}_vs_{}", a.max(b), a.min(b));
        let reply = execute(&server, Command::Battle { id: &id, viewer: Some(a) });
        assert_eq!(reply["status"], "success");
        assert_eq!(reply["battle"]["id"], id.as_str());
        assert_eq!(reply["battle"]["active"], true);

        let reply = execute(&server, Command::Battle { id: "nope", viewer: None });
        assert_eq!(reply["error"]["code"], 209);
    }
}
