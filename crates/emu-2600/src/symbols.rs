//! DASM symbol files.
//!
//! A cartridge may ship with a `.sym` sidecar produced by DASM. The
//! table always contains the canonical VCS register names; file symbols
//! fill in around them. Symbols beginning with a digit and containing a
//! period are location labels; everything else names an address in both
//! the read and write contexts.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use emu_core::Error;

use crate::memory::addresses;

/// One address-to-name table, sorted by address.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: BTreeMap<u16, String>,
    /// Widest symbol, for column formatting.
    pub max_width: usize,
}

impl Table {
    fn add(&mut self, address: u16, symbol: &str, prioritise: bool) {
        if !prioritise && self.entries.contains_key(&address) {
            return;
        }
        self.max_width = self.max_width.max(symbol.len());
        self.entries.insert(address, symbol.to_string());
    }

    /// The symbol for an address, if any.
    #[must_use]
    pub fn get(&self, address: u16) -> Option<&str> {
        self.entries.get(&address).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Symbol tables for one cartridge.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub locations: Table,
    pub read: Table,
    pub write: Table,
}

impl SymbolTable {
    /// The canonical VCS symbols only.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::default();
        table.add_canonical();
        table
    }

    /// Read the `.sym` sidecar next to a cartridge file. The table is
    /// valid even when the sidecar is missing - the canonical symbols
    /// are always present.
    ///
    /// # Errors
    ///
    /// `Error::Validation` when the sidecar exists but cannot be read.
    pub fn from_cartridge(cartridge_path: &Path) -> Result<Self, Error> {
        let sym_path = cartridge_path.with_extension("sym");
        if !sym_path.exists() {
            return Ok(Self::standard());
        }

        let contents = fs::read_to_string(&sym_path)
            .map_err(|e| Error::Validation(format!("symbols file: {e}")))?;
        Ok(Self::parse(&contents))
    }

    /// Parse DASM symbol-file contents.
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut table = Self::default();

        for line in contents.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();

            // header/divider lines and anything too short
            if fields.len() < 2 || fields[0] == "---" {
                continue;
            }

            let Ok(address) = u16::from_str_radix(fields[1], 16) else {
                continue;
            };
            let symbol = fields[0];

            // a symbol starting with a digit followed by a period is a
            // location label
            if symbol.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                if let Some(dot) = symbol.find('.') {
                    table.locations.add(address, &symbol[dot..], false);
                }
                continue;
            }

            // file symbols apply to both contexts; the canonical names
            // added below take priority over them
            table.read.add(address, symbol, false);
            table.write.add(address, symbol, false);
        }

        table.add_canonical();
        table
    }

    fn add_canonical(&mut self) {
        for (address, name) in addresses::TIA_READ.iter().chain(addresses::RIOT_READ) {
            self.read.add(*address, name, true);
        }
        for (address, name) in addresses::TIA_WRITE.iter().chain(addresses::RIOT_WRITE) {
            self.write.add(*address, name, true);
        }
    }
}
