//! Runtime configuration shared by the core and the driver binary.

use clap::ValueEnum;

/// What [`System::step`](crate::system::System::step) does when the CPU reports an opcode it
/// has no handler for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum IllegalOpcodePolicy {
    /// Stop and surface the error. The system stays halted until reset.
    #[default]
    Halt,
    /// Step over the opcode byte.
    Skip,
    /// Step over it and charge a 2-cycle NOP.
    Nop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub illegal_opcode: IllegalOpcodePolicy,
    /// nestest-style per-instruction trace.
    pub debug: bool,
    /// Window scale factor.
    pub scale: usize,
    /// Start here on reset instead of at the reset vector.
    pub entry_point: Option<u16>,
}

/// nestest.nes runs its whole suite unattended when started at $C000.
pub const NESTEST_ENTRY: u16 = 0xC000;

impl Default for Config {
    fn default() -> Self {
        Self {
            illegal_opcode: IllegalOpcodePolicy::Halt,
            debug: false,
            scale: 2,
            entry_point: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.illegal_opcode, IllegalOpcodePolicy::Halt);
        assert!(!c.debug);
        assert_eq!(c.scale, 2);
        assert_eq!(c.entry_point, None);
    }

    #[test]
    fn policy_parses_from_cli_names() {
        assert_eq!(
            IllegalOpcodePolicy::from_str("skip", true),
            Ok(IllegalOpcodePolicy::Skip)
        );
        assert_eq!(
            IllegalOpcodePolicy::from_str("NOP", true),
            Ok(IllegalOpcodePolicy::Nop)
        );
        assert!(IllegalOpcodePolicy::from_str("ignore", true).is_err());
    }
}
