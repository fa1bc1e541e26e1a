// Toy command line mirroring the pointer-driven interactions.
//
// Commands are looked up by exact name in a fixed table. Every failure ends
// up as a transcript line; nothing here can leave the session half-updated
// because handlers only go through the session's own transitions.

use log::{debug, info};

use crate::content::SectorId;
use crate::error::{CommandError, SessionError};
use crate::scheduler::TaskQueue;
use crate::session::Session;
use crate::view::Theme;

const SCAN_DELAY_MS: u64 = 1500;
const HACK_DELAY_MS: u64 = 1000;
const ANALYZE_DELAY_MS: u64 = 1000;
const MATRIX_DELAY_MS: u64 = 2000;
const WARP_DELAY_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Normal,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

/// State a handler may read or drive.
pub struct Console<'a> {
    pub session: &'a mut Session,
    pub theme: &'a mut Theme,
}

type Handler = fn(&mut Terminal, &mut Console<'_>, &[&str]) -> Result<(), CommandError>;

const COMMANDS: &[(&str, &str, Handler)] = &[
    ("help", "HELP - Show this help message", Terminal::help),
    ("clear", "CLEAR - Clear terminal output", Terminal::clear),
    ("status", "STATUS - Show system status", Terminal::status),
    ("random", "RANDOM - Select random question", Terminal::random),
    ("sectors", "SECTORS - List available sectors", Terminal::sectors),
    ("quantum", "QUANTUM - Enable quantum mode", Terminal::quantum),
    ("matrix", "MATRIX - Enter the matrix", Terminal::matrix),
    ("scan", "SCAN - Scan for available questions", Terminal::scan),
    ("hack", "HACK - Attempt system hack", Terminal::hack),
    ("analyze", "ANALYZE [sector] - Analyze sector data", Terminal::analyze),
    ("warp", "WARP [sector] - Warp to sector", Terminal::warp),
];

fn lookup(name: &str) -> Option<Handler> {
    COMMANDS
        .iter()
        .find(|(command, _, _)| *command == name)
        .map(|(_, _, handler)| *handler)
}

#[derive(Clone, Debug)]
enum Deferred {
    Line(LineKind, String),
    ListSectors,
    MatrixDone,
    Warp(SectorId),
}

#[derive(Default)]
pub struct Terminal {
    output: Vec<Line>,
    history: Vec<String>,
    tasks: TaskQueue<Deferred>,
    now_ms: u64,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &[Line] {
        &self.output
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.output.push(Line { kind, text: text.into() });
    }

    /// Transcript note for a warp that originated on the star map.
    pub fn warp_notice(&mut self, sector: SectorId) {
        self.push(
            LineKind::Warning,
            format!("> WARPING TO {} SECTOR...", sector.as_str().to_ascii_uppercase()),
        );
    }

    pub fn submit(&mut self, input: &str, console: &mut Console<'_>) {
        let command = input.trim();
        if command.is_empty() {
            return;
        }

        self.push(LineKind::Normal, format!("> {}", command));
        self.history.push(command.to_string());

        let lowered = command.to_lowercase();
        let mut parts = lowered.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        info!("terminal: {} {:?}", name, args);

        let result = match lookup(name) {
            Some(handler) => handler(self, console, &args),
            None => Err(CommandError::UnknownCommand(name.to_string())),
        };
        if let Err(err) = result {
            self.report(&err);
        }
    }

    /// Run deferred output and navigation now due.
    pub fn advance(&mut self, now_ms: u64, console: &mut Console<'_>) {
        self.now_ms = self.now_ms.max(now_ms);
        for task in self.tasks.drain_due(self.now_ms) {
            debug!("terminal deferred: {:?}", task);
            match task {
                Deferred::Line(kind, text) => self.push(kind, text),
                Deferred::ListSectors => self.list_sectors(console.session),
                Deferred::MatrixDone => {
                    console.theme.matrix = false;
                    self.push(LineKind::Success, "> MATRIX ACTIVATED");
                }
                Deferred::Warp(sector) => {
                    console.session.return_to_overview();
                    if let Err(err) = console.session.enter_sector(sector) {
                        self.push(LineKind::Error, format!("> ERROR: {}", err.to_string().to_uppercase()));
                    }
                }
            }
        }
    }

    fn report(&mut self, err: &CommandError) {
        match err {
            CommandError::UnknownCommand(name) => {
                self.push(LineKind::Error, format!("> COMMAND NOT RECOGNIZED: {}", name));
                self.push(LineKind::Warning, "> TYPE \"HELP\" FOR AVAILABLE COMMANDS");
            }
            CommandError::MissingArgument(what) => {
                self.push(LineKind::Error, format!("> ERROR: {} REQUIRED", what.to_uppercase()));
            }
            CommandError::UnknownSector(name) => {
                self.push(LineKind::Error, format!("> ERROR: SECTOR \"{}\" NOT FOUND", name));
            }
        }
    }

    fn defer(&mut self, delay_ms: u64, task: Deferred) {
        self.tasks.schedule(self.now_ms, delay_ms, task);
    }

    fn list_sectors(&mut self, session: &Session) {
        self.push(LineKind::Success, "> AVAILABLE SECTORS:");
        for &sector in SectorId::ALL.iter() {
            let total = session.catalog().questions(sector).len();
            self.push(
                LineKind::Normal,
                format!(
                    "  {}: {}/{} AVAILABLE",
                    sector.as_str().to_ascii_uppercase(),
                    session.available_in(sector),
                    total
                ),
            );
        }
    }

    fn help(&mut self, _console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        self.push(LineKind::Success, "> AVAILABLE COMMANDS:");
        for (_, usage, _) in COMMANDS {
            self.push(LineKind::Normal, format!("  {}", usage));
        }
        Ok(())
    }

    fn clear(&mut self, _console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        self.output.clear();
        self.push(LineKind::Success, "> TERMINAL CLEARED");
        Ok(())
    }

    fn status(&mut self, console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        let sector = console
            .session
            .current_sector()
            .map(|s| s.as_str().to_ascii_uppercase())
            .unwrap_or_else(|| "NONE".to_string());

        self.push(LineKind::Success, "> SYSTEM STATUS:");
        self.push(LineKind::Normal, "  QUANTUM CORE: ONLINE");
        self.push(LineKind::Normal, "  NEURAL LINK: ACTIVE");
        self.push(LineKind::Normal, format!("  SECTOR SCAN: {}", sector));
        self.push(LineKind::Normal, format!("  QUESTIONS LOCKED: {}", console.session.locked_total()));
        self.push(LineKind::Normal, "  TIME DILATION: STABLE");
        Ok(())
    }

    fn random(&mut self, console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        let Some(sector) = console.session.current_sector() else {
            self.push(LineKind::Error, "> ERROR: NO SECTOR SELECTED");
            return Ok(());
        };

        match console.session.pick_random_available(sector) {
            Ok(id) => {
                let text = console.session.catalog().question(id).unwrap_or_default().to_string();
                self.push(LineKind::Warning, "> QUANTUM SELECTION INITIATED...");
                self.push(LineKind::Success, format!("> SELECTED: {}", text));
            }
            Err(SessionError::NoAvailableQuestions(_)) => {
                self.push(LineKind::Error, "> ERROR: ALL QUESTIONS LOCKED");
            }
            Err(err) => {
                self.push(LineKind::Error, format!("> ERROR: {}", err.to_string().to_uppercase()));
            }
        }
        Ok(())
    }

    fn sectors(&mut self, console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        self.list_sectors(console.session);
        Ok(())
    }

    fn quantum(&mut self, console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        console.theme.quantum = !console.theme.quantum;
        let state = if console.theme.quantum { "ENABLED" } else { "DISABLED" };
        self.push(LineKind::Success, format!("> QUANTUM MODE {}", state));
        Ok(())
    }

    fn matrix(&mut self, console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        self.push(LineKind::Warning, "> ENTERING MATRIX...");
        console.theme.matrix = true;
        self.defer(MATRIX_DELAY_MS, Deferred::MatrixDone);
        Ok(())
    }

    fn scan(&mut self, _console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        self.push(LineKind::Warning, "> INITIATING QUANTUM SCAN...");
        self.defer(SCAN_DELAY_MS, Deferred::Line(LineKind::Success, "> SCAN COMPLETE".into()));
        self.defer(SCAN_DELAY_MS, Deferred::ListSectors);
        Ok(())
    }

    fn hack(&mut self, _console: &mut Console<'_>, _args: &[&str]) -> Result<(), CommandError> {
        self.push(LineKind::Error, "> INITIATING SYSTEM HACK...");
        self.defer(HACK_DELAY_MS, Deferred::Line(LineKind::Error, "> ACCESS DENIED - FIREWALL ACTIVE".into()));
        self.defer(HACK_DELAY_MS, Deferred::Line(LineKind::Warning, "> SECURITY PROTOCOLS ENGAGED".into()));
        Ok(())
    }

    fn analyze(&mut self, console: &mut Console<'_>, args: &[&str]) -> Result<(), CommandError> {
        let sector = sector_arg(args, "sector specification")?;
        let session = &console.session;
        let total = session.catalog().questions(sector).len();
        let locked = session.locked_in(sector);

        self.push(
            LineKind::Warning,
            format!("> ANALYZING SECTOR: {}", sector.as_str().to_ascii_uppercase()),
        );
        let report = [
            format!("  TOTAL QUESTIONS: {}", total),
            format!("  AVAILABLE: {}", total - locked),
            format!("  LOCKED: {}", locked),
            format!("  SECURITY LEVEL: {}", if locked > 0 { "ELEVATED" } else { "NORMAL" }),
        ];
        for line in report {
            self.defer(ANALYZE_DELAY_MS, Deferred::Line(LineKind::Normal, line));
        }
        Ok(())
    }

    fn warp(&mut self, _console: &mut Console<'_>, args: &[&str]) -> Result<(), CommandError> {
        let sector = sector_arg(args, "destination sector")?;
        self.push(
            LineKind::Warning,
            format!("> INITIATING WARP TO {}...", sector.as_str().to_ascii_uppercase()),
        );
        self.defer(WARP_DELAY_MS, Deferred::Warp(sector));
        Ok(())
    }
}

fn sector_arg(args: &[&str], what: &'static str) -> Result<SectorId, CommandError> {
    let raw = args.first().ok_or(CommandError::MissingArgument(what))?;
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Catalog;
    use crate::session::Phase;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Rig {
        terminal: Terminal,
        session: Session,
        theme: Theme,
    }

    impl Rig {
        fn new() -> Self {
            Rig {
                terminal: Terminal::new(),
                session: Session::new(Catalog::builtin(), StdRng::seed_from_u64(3)),
                theme: Theme::default(),
            }
        }

        fn run(&mut self, line: &str) -> Vec<Line> {
            let before = self.terminal.output().len();
            let mut console = Console { session: &mut self.session, theme: &mut self.theme };
            self.terminal.submit(line, &mut console);
            self.terminal.output()[before.min(self.terminal.output().len())..].to_vec()
        }

        fn advance(&mut self, now_ms: u64) -> Vec<Line> {
            let before = self.terminal.output().len();
            let mut console = Console { session: &mut self.session, theme: &mut self.theme };
            self.terminal.advance(now_ms, &mut console);
            self.terminal.output()[before..].to_vec()
        }
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn unknown_command_yields_two_lines_after_echo() {
        let mut rig = Rig::new();
        let lines = rig.run("Teleport now");
        assert_eq!(
            texts(&lines),
            [
                "> Teleport now",
                "> COMMAND NOT RECOGNIZED: teleport",
                "> TYPE \"HELP\" FOR AVAILABLE COMMANDS"
            ]
        );
        assert_eq!(lines[1].kind, LineKind::Error);
        assert_eq!(lines[2].kind, LineKind::Warning);
        assert_eq!(rig.session.phase(), Phase::Overview);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut rig = Rig::new();
        assert!(rig.run("   ").is_empty());
        assert!(rig.terminal.history().is_empty());
    }

    #[test]
    fn help_lists_every_command() {
        let mut rig = Rig::new();
        let lines = rig.run("help");
        assert_eq!(lines.len(), 2 + COMMANDS.len());
        assert!(lines.iter().any(|l| l.text == "  WARP [sector] - Warp to sector"));
    }

    #[test]
    fn missing_and_unknown_sector_arguments() {
        let mut rig = Rig::new();
        assert_eq!(texts(&rig.run("analyze")[1..]), ["> ERROR: SECTOR SPECIFICATION REQUIRED"]);
        assert_eq!(texts(&rig.run("warp")[1..]), ["> ERROR: DESTINATION SECTOR REQUIRED"]);
        assert_eq!(texts(&rig.run("warp cooking")[1..]), ["> ERROR: SECTOR \"cooking\" NOT FOUND"]);
        assert_eq!(rig.terminal.pending(), 0);
    }

    #[test]
    fn random_without_sector_is_an_error_line() {
        let mut rig = Rig::new();
        assert_eq!(texts(&rig.run("random")[1..]), ["> ERROR: NO SECTOR SELECTED"]);
    }

    #[test]
    fn random_goes_through_the_session() {
        let mut rig = Rig::new();
        rig.session.enter_sector(SectorId::Gaming).unwrap();
        let lines = rig.run("RANDOM");
        assert_eq!(lines[1].text, "> QUANTUM SELECTION INITIATED...");
        assert!(lines[2].text.starts_with("> SELECTED: "));
        assert_eq!(rig.session.locked_in(SectorId::Gaming), 4);

        assert_eq!(texts(&rig.run("random")[1..]), ["> ERROR: ALL QUESTIONS LOCKED"]);
        assert_eq!(rig.session.locked_total(), 4);
    }

    #[test]
    fn status_and_sectors_reflect_locks() {
        let mut rig = Rig::new();
        rig.session.enter_sector(SectorId::Anime).unwrap();
        rig.session.select_question(SectorId::Anime, 0).unwrap();

        let status = rig.run("status");
        assert!(status.iter().any(|l| l.text == "  SECTOR SCAN: ANIME"));
        assert!(status.iter().any(|l| l.text == "  QUESTIONS LOCKED: 4"));

        let sectors = rig.run("sectors");
        assert!(sectors.iter().any(|l| l.text == "  ANIME: 0/4 AVAILABLE"));
        assert!(sectors.iter().any(|l| l.text == "  GAMING: 4/4 AVAILABLE"));
    }

    #[test]
    fn analyze_reports_after_delay() {
        let mut rig = Rig::new();
        let lines = rig.run("analyze fantasy");
        assert_eq!(lines[1].text, "> ANALYZING SECTOR: FANTASY");
        assert!(rig.advance(ANALYZE_DELAY_MS - 1).is_empty());
        assert_eq!(
            texts(&rig.advance(ANALYZE_DELAY_MS)),
            ["  TOTAL QUESTIONS: 4", "  AVAILABLE: 4", "  LOCKED: 0", "  SECURITY LEVEL: NORMAL"]
        );
    }

    #[test]
    fn warp_navigates_after_delay() {
        let mut rig = Rig::new();
        rig.session.enter_sector(SectorId::Anime).unwrap();
        rig.run("warp sitcoms");
        assert_eq!(rig.session.current_sector(), Some(SectorId::Anime));
        rig.advance(WARP_DELAY_MS);
        assert_eq!(rig.session.phase(), Phase::SectorActive(SectorId::Sitcoms));
    }

    #[test]
    fn theme_flags_toggle() {
        let mut rig = Rig::new();
        assert_eq!(texts(&rig.run("quantum")[1..]), ["> QUANTUM MODE ENABLED"]);
        assert!(rig.theme.quantum);
        assert_eq!(texts(&rig.run("quantum")[1..]), ["> QUANTUM MODE DISABLED"]);

        rig.run("matrix");
        assert!(rig.theme.matrix);
        assert_eq!(texts(&rig.advance(MATRIX_DELAY_MS)), ["> MATRIX ACTIVATED"]);
        assert!(!rig.theme.matrix);
    }

    #[test]
    fn scan_and_hack_are_deferred() {
        let mut rig = Rig::new();
        rig.run("scan");
        rig.run("hack");
        let hack = rig.advance(HACK_DELAY_MS);
        assert_eq!(texts(&hack), ["> ACCESS DENIED - FIREWALL ACTIVE", "> SECURITY PROTOCOLS ENGAGED"]);
        let scan = rig.advance(SCAN_DELAY_MS);
        assert_eq!(scan[0].text, "> SCAN COMPLETE");
        assert_eq!(scan[1].text, "> AVAILABLE SECTORS:");
        assert_eq!(scan.len(), 2 + SectorId::ALL.len());
    }

    #[test]
    fn clear_keeps_only_confirmation_and_history_survives() {
        let mut rig = Rig::new();
        rig.run("status");
        rig.run("clear");
        assert_eq!(texts(rig.terminal.output()), ["> TERMINAL CLEARED"]);
        assert_eq!(rig.terminal.history(), ["status", "clear"]);
    }

    #[test]
    fn star_map_warp_notice() {
        let mut rig = Rig::new();
        rig.terminal.warp_notice(SectorId::Gaming);
        assert_eq!(rig.terminal.output()[0].text, "> WARPING TO GAMING SECTOR...");
    }
}
