//! RV32 instruction definitions

/// Registers the generator touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Sp,
    Fp,
    Ra,
    T0,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
}

/// Argument registers in calling-convention order
pub const ARG_REGS: [Reg; 6] = [Reg::A0, Reg::A1, Reg::A2, Reg::A3, Reg::A4, Reg::A5];

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reg::Sp => write!(f, "sp"),
            Reg::Fp => write!(f, "fp"),
            Reg::Ra => write!(f, "ra"),
            Reg::T0 => write!(f, "t0"),
            Reg::A0 => write!(f, "a0"),
            Reg::A1 => write!(f, "a1"),
            Reg::A2 => write!(f, "a2"),
            Reg::A3 => write!(f, "a3"),
            Reg::A4 => write!(f, "a4"),
            Reg::A5 => write!(f, "a5"),
        }
    }
}

/// Range of a 12-bit signed I-type immediate
pub const IMM12_MIN: i64 = -2048;
pub const IMM12_MAX: i64 = 2047;

pub fn fits_imm12(imm: i64) -> bool {
    (IMM12_MIN..=IMM12_MAX).contains(&imm)
}

/// RV32 instructions and assembler lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RvInst {
    Li(Reg, i64),
    Addi(Reg, Reg, i64),
    /// `sw src, offset(base)`
    Sw(Reg, i64, Reg),
    /// `lw dst, offset(base)`
    Lw(Reg, i64, Reg),

    Add(Reg, Reg, Reg),
    Sub(Reg, Reg, Reg),
    Mul(Reg, Reg, Reg),
    Div(Reg, Reg, Reg),
    Neg(Reg, Reg),

    Xor(Reg, Reg, Reg),
    Xori(Reg, Reg, i64),
    Seqz(Reg, Reg),
    Snez(Reg, Reg),
    Slt(Reg, Reg, Reg),
    Mv(Reg, Reg),

    J(String),
    Beqz(Reg, String),
    Call(String),
    Ret,

    Label(String),
    Comment(String),
    Directive(String),
}

impl RvInst {
    /// Format instruction as assembly text
    pub fn format(&self) -> String {
        match self {
            RvInst::Li(rd, imm) => format!("    li {}, {}", rd, imm),
            RvInst::Addi(rd, rs, imm) => format!("    addi {}, {}, {}", rd, rs, imm),
            RvInst::Sw(rs, off, base) => format!("    sw {}, {}({})", rs, off, base),
            RvInst::Lw(rd, off, base) => format!("    lw {}, {}({})", rd, off, base),

            RvInst::Add(rd, r1, r2) => format!("    add {}, {}, {}", rd, r1, r2),
            RvInst::Sub(rd, r1, r2) => format!("    sub {}, {}, {}", rd, r1, r2),
            RvInst::Mul(rd, r1, r2) => format!("    mul {}, {}, {}", rd, r1, r2),
            RvInst::Div(rd, r1, r2) => format!("    div {}, {}, {}", rd, r1, r2),
            RvInst::Neg(rd, rs) => format!("    neg {}, {}", rd, rs),

            RvInst::Xor(rd, r1, r2) => format!("    xor {}, {}, {}", rd, r1, r2),
            RvInst::Xori(rd, rs, imm) => format!("    xori {}, {}, {}", rd, rs, imm),
            RvInst::Seqz(rd, rs) => format!("    seqz {}, {}", rd, rs),
            RvInst::Snez(rd, rs) => format!("    snez {}, {}", rd, rs),
            RvInst::Slt(rd, r1, r2) => format!("    slt {}, {}, {}", rd, r1, r2),
            RvInst::Mv(rd, rs) => format!("    mv {}, {}", rd, rs),

            RvInst::J(l) => format!("    j {}", l),
            RvInst::Beqz(rs, l) => format!("    beqz {}, {}", rs, l),
            RvInst::Call(l) => format!("    call {}", l),
            RvInst::Ret => "    ret".to_string(),

            RvInst::Label(l) => format!("{}:", l),
            RvInst::Comment(c) => format!("    # {}", c),
            RvInst::Directive(d) => format!("    {}", d),
        }
    }
}
