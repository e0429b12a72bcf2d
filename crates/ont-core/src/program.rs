//! NeoVM program construction: push opcodes, verification programs for
//! single and multisig accounts.

use crate::crypto::PublicKey;
use crate::error::AddressError;

/// VM opcodes used by invoke payloads and verification programs.
pub mod opcode {
    pub const PUSH0: u8 = 0x00;
    pub const PUSHF: u8 = PUSH0;
    pub const PUSHBYTES75: u8 = 0x4b;
    pub const PUSHDATA1: u8 = 0x4c;
    pub const PUSHDATA2: u8 = 0x4d;
    pub const PUSHDATA4: u8 = 0x4e;
    pub const PUSHM1: u8 = 0x4f;
    pub const PUSH1: u8 = 0x51;
    pub const PUSHT: u8 = PUSH1;
    pub const PUSH16: u8 = 0x60;
    pub const SYSCALL: u8 = 0x68;
    pub const DUPFROMALTSTACK: u8 = 0x6a;
    pub const TOALTSTACK: u8 = 0x6b;
    pub const FROMALTSTACK: u8 = 0x6c;
    pub const SWAP: u8 = 0x7c;
    pub const CHECKSIG: u8 = 0xac;
    pub const CHECKMULTISIG: u8 = 0xae;
    pub const PACK: u8 = 0xc1;
    pub const NEWSTRUCT: u8 = 0xc6;
    pub const APPEND: u8 = 0xc8;
}

/// Append-only VM script builder.
#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    code: Vec<u8>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, op: u8) -> &mut Self {
        self.code.push(op);
        self
    }

    pub fn push_bool(&mut self, v: bool) -> &mut Self {
        self.emit(if v { opcode::PUSHT } else { opcode::PUSHF })
    }

    /// Small integers (-1..=16) use dedicated opcodes; everything else is
    /// pushed as minimal two's-complement little-endian bytes.
    pub fn push_int(&mut self, v: i128) -> &mut Self {
        match v {
            -1 => self.emit(opcode::PUSHM1),
            0 => self.emit(opcode::PUSH0),
            1..=16 => self.emit(opcode::PUSH1 - 1 + v as u8),
            _ => {
                let bytes = int_to_vm_bytes(v);
                self.push_bytes(&bytes)
            }
        }
    }

    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if len == 0 {
            return self.emit(opcode::PUSH0);
        }
        if len <= opcode::PUSHBYTES75 as usize {
            self.code.push(len as u8);
        } else if len <= 0xff {
            self.code.push(opcode::PUSHDATA1);
            self.code.push(len as u8);
        } else if len <= 0xffff {
            self.code.push(opcode::PUSHDATA2);
            self.code.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.code.push(opcode::PUSHDATA4);
            self.code.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.code.extend_from_slice(data);
        self
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.code
    }
}

/// Shortest two's-complement little-endian encoding of `v`.
fn int_to_vm_bytes(v: i128) -> Vec<u8> {
    let bytes = v.to_le_bytes();
    let mut len = bytes.len();
    while len > 1 {
        let last = bytes[len - 1];
        let sign_bit = bytes[len - 2] & 0x80;
        if (last == 0x00 && sign_bit == 0) || (last == 0xff && sign_bit != 0) {
            len -= 1;
        } else {
            break;
        }
    }
    bytes[..len].to_vec()
}

/// `PUSH(pubkey) CHECKSIG`.
pub fn program_from_pubkey(public_key: &PublicKey) -> Vec<u8> {
    let mut b = ProgramBuilder::new();
    b.push_bytes(&public_key.to_compressed()).emit(opcode::CHECKSIG);
    b.into_bytes()
}

/// `PUSH(m) PUSH(pk_1) .. PUSH(pk_n) PUSH(n) CHECKMULTISIG` with keys in
/// canonical order, so the resulting program does not depend on the order
/// the caller lists them in.
pub fn program_from_multi_pubkeys(m: usize, keys: &[PublicKey]) -> Result<Vec<u8>, AddressError> {
    let n = keys.len();
    if n == 0 || m == 0 || m > n || n > crate::constants::MAX_MULTISIG_KEYS {
        return Err(AddressError::InvalidThreshold { m, n });
    }
    let mut sorted = keys.to_vec();
    sorted.sort();

    let mut b = ProgramBuilder::new();
    b.push_int(m as i128);
    for key in &sorted {
        b.push_bytes(&key.to_compressed());
    }
    b.push_int(n as i128).emit(opcode::CHECKMULTISIG);
    Ok(b.into_bytes())
}
