use bitflags::bitflags;
use tracing::debug;

use crate::class::SegmentClass;
use crate::error::ParseErrorReason;
use crate::pathname::Pathname;
use crate::region::Region;
use crate::space::AddressSpace;

/// Which CPU register a resolved/unmapped address came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterRole {
    Pc,
    Lr,
    Sp,
    Fp,
}

/// Crash-time register values. Each field is independently optional so
/// that "not provided" and "provided and zero" (a real, resolvable
/// `Pc = 0`) are never confused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrashContext {
    pub pc: Option<u64>,
    pub lr: Option<u64>,
    pub sp: Option<u64>,
    pub fp: Option<u64>,
}

impl CrashContext {
    pub fn is_empty(&self) -> bool {
        self.pc.is_none() && self.lr.is_none() && self.sp.is_none() && self.fp.is_none()
    }

    /// Builds a context from raw hex strings as a collaborator CLI would
    /// receive them: optional `0x`/`0X` prefix, case-insensitive,
    /// leading zeros permitted.
    pub fn from_hex(
        pc: Option<&str>,
        lr: Option<&str>,
        sp: Option<&str>,
        fp: Option<&str>,
    ) -> Result<Self, ParseErrorReason> {
        Ok(Self {
            pc: pc.map(parse_register_hex).transpose()?,
            lr: lr.map(parse_register_hex).transpose()?,
            sp: sp.map(parse_register_hex).transpose()?,
            fp: fp.map(parse_register_hex).transpose()?,
        })
    }

    fn provided(&self) -> impl Iterator<Item = (RegisterRole, u64)> + '_ {
        [
            (RegisterRole::Pc, self.pc),
            (RegisterRole::Lr, self.lr),
            (RegisterRole::Sp, self.sp),
            (RegisterRole::Fp, self.fp),
        ]
        .into_iter()
        .filter_map(|(role, address)| address.map(|a| (role, a)))
    }
}

fn parse_register_hex(raw: &str) -> Result<u64, ParseErrorReason> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseErrorReason::MalformedLine);
    }
    u64::from_str_radix(digits, 16).map_err(|_| ParseErrorReason::AddressOverflow)
}

bitflags! {
    /// Advisory flags attached to a crash resolution. These are never
    /// errors; they describe conditions a reader should notice.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Diagnostics: u8 {
        const PC_NOT_IN_EXECUTABLE = 1 << 0;
        const SP_OUTSIDE_STACK_REGION = 1 << 1;
        const IN_WRITABLE_EXECUTABLE = 1 << 2;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved {
        region_index: usize,
        offset_in_region: u64,
        containing_binary: String,
        symbolization_command: Option<String>,
    },
    Unmapped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrashResolution {
    pub register_role: RegisterRole,
    pub address: u64,
    pub outcome: ResolutionOutcome,
    pub diagnostics: Diagnostics,
}

/// Resolves every register present in `context` against `space`, in
/// the fixed order `[Pc, Lr, Sp, Fp]`, omitting absent registers. Pure:
/// performs no I/O and never fails — an out-of-range address is a
/// normal `Unmapped` outcome, not an error.
pub fn resolve(context: &CrashContext, space: &AddressSpace) -> Vec<CrashResolution> {
    context
        .provided()
        .map(|(role, address)| resolve_one(role, address, space))
        .collect()
}

fn resolve_one(role: RegisterRole, address: u64, space: &AddressSpace) -> CrashResolution {
    let Some((region_index, region)) = space.find(address) else {
        debug!(?role, address, "register unmapped");
        return CrashResolution {
            register_role: role,
            address,
            outcome: ResolutionOutcome::Unmapped,
            diagnostics: Diagnostics::empty(),
        };
    };

    let offset_in_region = address - region.start;
    let containing_binary = region.pathname.as_str().to_owned();
    let symbolization_command = symbolization_command(region, offset_in_region);

    let mut diagnostics = Diagnostics::empty();
    if role == RegisterRole::Pc && !region.is_executable() {
        diagnostics |= Diagnostics::PC_NOT_IN_EXECUTABLE;
    }
    if matches!(role, RegisterRole::Sp | RegisterRole::Fp)
        && region.classification != SegmentClass::Stack
    {
        diagnostics |= Diagnostics::SP_OUTSIDE_STACK_REGION;
    }
    if region.is_writable() && region.is_executable() {
        diagnostics |= Diagnostics::IN_WRITABLE_EXECUTABLE;
    }

    debug!(?role, address, region_index, offset_in_region, "register resolved");

    CrashResolution {
        register_role: role,
        address,
        outcome: ResolutionOutcome::Resolved {
            region_index,
            offset_in_region,
            containing_binary,
            symbolization_command,
        },
        diagnostics,
    }
}

fn symbolization_command(region: &Region, offset: u64) -> Option<String> {
    let Pathname::FileBacked(path) = &region.pathname else {
        return None;
    };
    match region.classification {
        SegmentClass::Code | SegmentClass::Rodata => {
            Some(format!("addr2line -e {path} 0x{offset:x}"))
        }
        _ => None,
    }
}
