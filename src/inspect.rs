//! Reading platform and required libraries out of PE and ELF files.

use crate::format::BinaryFormat;
use crate::index::absolute;
use crate::info::{LibInfo, Platform};
use crate::Error;
use camino::Utf8Path;
use goblin::elf::Elf;
use goblin::pe::PE;
use goblin::Object;
use memmap2::Mmap;
use std::collections::HashSet;
use std::fs::File;
use tracing::trace;

/// API set names resolved by the Windows loader, never backed by a file.
const API_SET_PREFIXES: [&str; 2] = ["api-ms-win-", "ext-ms-"];

/// Produces a fully populated [`LibInfo`] for a file, or fails.
pub trait Inspect {
    fn inspect(&self, path: &Utf8Path) -> Result<LibInfo, Error>;
}

impl<F> Inspect for F
where
    F: Fn(&Utf8Path) -> Result<LibInfo, Error>,
{
    fn inspect(&self, path: &Utf8Path) -> Result<LibInfo, Error> {
        self(path)
    }
}

/// Inspector backed by goblin, dispatching on [`BinaryFormat::classify`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryInspector;

impl Inspect for BinaryInspector {
    fn inspect(&self, path: &Utf8Path) -> Result<LibInfo, Error> {
        match BinaryFormat::classify(path) {
            BinaryFormat::Pe => parse_pe_file(path),
            BinaryFormat::Elf => parse_elf_file(path),
            BinaryFormat::Unknown => Err(Error::UnknownFormat(path.to_owned())),
        }
    }
}

/// Read a PE image's platform and imported DLL names.
pub fn parse_pe_file(path: &Utf8Path) -> Result<LibInfo, Error> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let pe = match Object::parse(&mmap)? {
        Object::PE(pe) => pe,
        _ => return Err(Error::UnknownFormat(path.to_owned())),
    };

    let platform = pe_platform(&pe, path)?;
    let dependencies = import_names(pe.libraries.iter().copied());
    trace!("{}: {} with {} imports", path, platform, dependencies.len());

    Ok(LibInfo::new(
        absolute(path.as_std_path())?,
        platform,
        dependencies,
    ))
}

/// Read an ELF object's platform and `DT_NEEDED` entries.
pub fn parse_elf_file(path: &Utf8Path) -> Result<LibInfo, Error> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let elf = match Object::parse(&mmap)? {
        Object::Elf(elf) => elf,
        _ => return Err(Error::UnknownFormat(path.to_owned())),
    };

    let platform = elf_platform(&elf, path)?;
    let dependencies: Vec<String> = elf.libraries.iter().map(|s| s.to_string()).collect();
    trace!("{}: {} with {} needed", path, platform, dependencies.len());

    Ok(LibInfo::new(
        absolute(path.as_std_path())?,
        platform,
        dependencies,
    ))
}

fn pe_platform(pe: &PE, path: &Utf8Path) -> Result<Platform, Error> {
    use goblin::pe::header;
    let machine = pe.header.coff_header.machine;
    match machine {
        header::COFF_MACHINE_X86 => Ok(Platform::Win32),
        header::COFF_MACHINE_X86_64 => Ok(Platform::Win64),
        header::COFF_MACHINE_ARM64 => Ok(Platform::WinArm64),
        _ => Err(Error::UnsupportedArchitecture {
            path: path.to_owned(),
            machine,
        }),
    }
}

fn elf_platform(elf: &Elf, path: &Utf8Path) -> Result<Platform, Error> {
    use goblin::elf::header;
    let machine = elf.header.e_machine;
    match machine {
        header::EM_386 => Ok(Platform::Unix32),
        header::EM_X86_64 => Ok(Platform::Unix64),
        header::EM_ARM => Ok(Platform::UnixArm32),
        header::EM_AARCH64 => Ok(Platform::UnixArm64),
        _ => Err(Error::UnsupportedArchitecture {
            path: path.to_owned(),
            machine,
        }),
    }
}

/// Imported DLL names, first occurrence wins, API sets dropped.
fn import_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| !is_api_set(name))
        .filter(|name| seen.insert(name.to_uppercase()))
        .map(str::to_string)
        .collect()
}

fn is_api_set(name: &str) -> bool {
    let lower = name.to_lowercase();
    API_SET_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}
