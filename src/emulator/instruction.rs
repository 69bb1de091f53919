use crate::util::bit_splitter::BitSplitter;

/// A 12-bit memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A general register index, 0x0 through 0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

/// An immediate constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub u8);

/// A single decoded instruction.
/// The comment after each variant is its opcode pattern, where
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: register indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    MachineRoutine(Addr),             // 0NNN
    ClearScreen,                      // 00E0
    Return,                           // 00EE
    Goto(Addr),                       // 1NNN
    Call(Addr),                       // 2NNN
    IfRegEqConst(Reg, Const),         // 3XNN
    IfRegNeqConst(Reg, Const),        // 4XNN
    IfRegEqReg(Reg, Reg),             // 5XY0
    SetRegToConst(Reg, Const),        // 6XNN
    IncRegByConst(Reg, Const),        // 7XNN
    SetRegToReg(Reg, Reg),            // 8XY0
    BitwiseOr(Reg, Reg),              // 8XY1
    BitwiseAnd(Reg, Reg),             // 8XY2
    BitwiseXor(Reg, Reg),             // 8XY3
    IncRegByReg(Reg, Reg),            // 8XY4
    DecRegByReg(Reg, Reg),            // 8XY5
    BitshiftRight(Reg, Reg),          // 8XY6
    SetVxVyMinusVx(Reg, Reg),         // 8XY7
    BitshiftLeft(Reg, Reg),           // 8XYE
    IfRegNeqReg(Reg, Reg),            // 9XY0
    SetI(Addr),                       // ANNN
    SetPcToV0PlusAddr(Addr),          // BNNN
    SetVxRand(Reg, Const),            // CXNN
    Draw(Reg, Reg, Const),            // DXYN
    IfKeyEqVx(Reg),                   // EX9E
    IfKeyNeqVx(Reg),                  // EXA1
    SetRegToDelayTimer(Reg),          // FX07
    SetRegToGetKey(Reg),              // FX0A
    SetDelayTimerToReg(Reg),          // FX15
    SetSoundTimerToReg(Reg),          // FX18
    AddRegToI(Reg),                   // FX1E
    SetIToSpriteAddrVx(Reg),          // FX29
    SetIToBcdOfReg(Reg),              // FX33
    RegDump(Reg),                     // FX55
    RegLoad(Reg),                     // FX65
    Unknown(u16),
}

impl Instruction {
    /// Decode an opcode. Anything outside the instruction set becomes `Unknown`.
    pub fn decode(opcode: u16) -> Instruction {
        let op = BitSplitter::new(opcode);
        let (x, y) = (Reg(op.x()), Reg(op.y()));
        let addr = Addr(op.addr());
        let nn = Const(op.byte());
        match op.nibbles() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (0, _, _, _) => Instruction::MachineRoutine(addr),
            (1, _, _, _) => Instruction::Goto(addr),
            (2, _, _, _) => Instruction::Call(addr),
            (3, _, _, _) => Instruction::IfRegEqConst(x, nn),
            (4, _, _, _) => Instruction::IfRegNeqConst(x, nn),
            (5, _, _, 0) => Instruction::IfRegEqReg(x, y),
            (6, _, _, _) => Instruction::SetRegToConst(x, nn),
            (7, _, _, _) => Instruction::IncRegByConst(x, nn),
            (8, _, _, 0) => Instruction::SetRegToReg(x, y),
            (8, _, _, 1) => Instruction::BitwiseOr(x, y),
            (8, _, _, 2) => Instruction::BitwiseAnd(x, y),
            (8, _, _, 3) => Instruction::BitwiseXor(x, y),
            (8, _, _, 4) => Instruction::IncRegByReg(x, y),
            (8, _, _, 5) => Instruction::DecRegByReg(x, y),
            (8, _, _, 6) => Instruction::BitshiftRight(x, y),
            (8, _, _, 7) => Instruction::SetVxVyMinusVx(x, y),
            (8, _, _, 0xE) => Instruction::BitshiftLeft(x, y),
            (9, _, _, 0) => Instruction::IfRegNeqReg(x, y),
            (0xA, _, _, _) => Instruction::SetI(addr),
            (0xB, _, _, _) => Instruction::SetPcToV0PlusAddr(addr),
            (0xC, _, _, _) => Instruction::SetVxRand(x, nn),
            (0xD, _, _, n) => Instruction::Draw(x, y, Const(n)),
            (0xE, _, 9, 0xE) => Instruction::IfKeyEqVx(x),
            (0xE, _, 0xA, 1) => Instruction::IfKeyNeqVx(x),
            (0xF, _, 0, 7) => Instruction::SetRegToDelayTimer(x),
            (0xF, _, 0, 0xA) => Instruction::SetRegToGetKey(x),
            (0xF, _, 1, 5) => Instruction::SetDelayTimerToReg(x),
            (0xF, _, 1, 8) => Instruction::SetSoundTimerToReg(x),
            (0xF, _, 1, 0xE) => Instruction::AddRegToI(x),
            (0xF, _, 2, 9) => Instruction::SetIToSpriteAddrVx(x),
            (0xF, _, 3, 3) => Instruction::SetIToBcdOfReg(x),
            (0xF, _, 5, 5) => Instruction::RegDump(x),
            (0xF, _, 6, 5) => Instruction::RegLoad(x),
            _ => Instruction::Unknown(opcode),
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Instruction::Draw(..))
    }
}
