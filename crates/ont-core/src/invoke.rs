//! Native contract invoke payloads.
//!
//! A payload pushes the arguments, then the method name, the contract
//! address and the contract version, and finally calls
//! `SYSCALL "Ontology.Native.Invoke"`.

use serde_json::Value;

use crate::address::Address;
use crate::constants::{MAX_PARAM_DEPTH, NATIVE_INVOKE_NAME};
use crate::error::EncodingError;
use crate::program::{ProgramBuilder, opcode};

/// A value that can be passed to a native contract method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeParam {
    Bool(bool),
    Integer(i128),
    Bytes(Vec<u8>),
    String(String),
    Address(Address),
    /// Encoded as a VM struct, fields in order.
    Struct(Vec<NativeParam>),
    /// Encoded as a packed VM array.
    Array(Vec<NativeParam>),
}

impl NativeParam {
    /// Parse a typed JSON argument such as
    /// `{"type": "Integer", "value": "100"}`.
    ///
    /// `Integer` accepts a JSON number or a decimal string, `ByteArray` a
    /// hex string, `Address` base58 text, `Array` and `Struct` a list of
    /// typed arguments.
    pub fn from_typed_json(value: &Value) -> Result<Self, EncodingError> {
        let obj = value
            .as_object()
            .ok_or_else(|| EncodingError::UnsupportedType(json_kind(value).to_string()))?;
        let ty = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EncodingError::UnsupportedType("missing type".into()))?;
        let inner = obj
            .get("value")
            .ok_or_else(|| EncodingError::InvalidValue(format!("{ty}: missing value")))?;

        match ty {
            "Boolean" => inner
                .as_bool()
                .map(NativeParam::Bool)
                .ok_or_else(|| EncodingError::InvalidValue(format!("Boolean: {inner}"))),
            "Integer" => parse_integer(inner).map(NativeParam::Integer),
            "String" => inner
                .as_str()
                .map(|s| NativeParam::String(s.to_string()))
                .ok_or_else(|| EncodingError::InvalidValue(format!("String: {inner}"))),
            "ByteArray" => {
                let s = inner
                    .as_str()
                    .ok_or_else(|| EncodingError::InvalidValue(format!("ByteArray: {inner}")))?;
                hex::decode(s)
                    .map(NativeParam::Bytes)
                    .map_err(|e| EncodingError::InvalidValue(format!("ByteArray: {e}")))
            }
            "Address" => {
                let s = inner
                    .as_str()
                    .ok_or_else(|| EncodingError::InvalidValue(format!("Address: {inner}")))?;
                Address::decode(s)
                    .map(NativeParam::Address)
                    .map_err(|e| EncodingError::InvalidValue(format!("Address: {e}")))
            }
            "Array" | "Struct" => {
                let items = inner
                    .as_array()
                    .ok_or_else(|| EncodingError::InvalidValue(format!("{ty}: {inner}")))?
                    .iter()
                    .map(Self::from_typed_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if ty == "Array" {
                    NativeParam::Array(items)
                } else {
                    NativeParam::Struct(items)
                })
            }
            other => Err(EncodingError::UnsupportedType(other.to_string())),
        }
    }

    fn emit(&self, b: &mut ProgramBuilder, depth: usize) -> Result<(), EncodingError> {
        if depth > MAX_PARAM_DEPTH {
            return Err(EncodingError::NestingTooDeep(MAX_PARAM_DEPTH));
        }
        match self {
            NativeParam::Bool(v) => {
                b.push_bool(*v);
            }
            NativeParam::Integer(v) => {
                b.push_int(*v);
            }
            NativeParam::Bytes(v) => {
                b.push_bytes(v);
            }
            NativeParam::String(v) => {
                b.push_bytes(v.as_bytes());
            }
            NativeParam::Address(v) => {
                b.push_bytes(v.as_bytes());
            }
            NativeParam::Struct(fields) => {
                b.push_int(0).emit(opcode::NEWSTRUCT).emit(opcode::TOALTSTACK);
                for field in fields {
                    field.emit(b, depth + 1)?;
                    b.emit(opcode::DUPFROMALTSTACK)
                        .emit(opcode::SWAP)
                        .emit(opcode::APPEND);
                }
                b.emit(opcode::FROMALTSTACK);
            }
            NativeParam::Array(items) => {
                for item in items.iter().rev() {
                    item.emit(b, depth + 1)?;
                }
                b.push_int(items.len() as i128).emit(opcode::PACK);
            }
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_integer(value: &Value) -> Result<i128, EncodingError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(v as i128)
            } else if let Some(v) = n.as_u64() {
                Ok(v as i128)
            } else {
                Err(EncodingError::InvalidValue(format!("Integer: {n}")))
            }
        }
        Value::String(s) => s.trim().parse::<i128>().map_err(|e| {
            use std::num::IntErrorKind;
            match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    EncodingError::IntegerOutOfRange(s.clone())
                }
                _ => EncodingError::InvalidValue(format!("Integer: {s}")),
            }
        }),
        other => Err(EncodingError::InvalidValue(format!("Integer: {other}"))),
    }
}

/// One leg of a token transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

impl From<&State> for NativeParam {
    fn from(state: &State) -> Self {
        NativeParam::Struct(vec![
            NativeParam::Address(state.from),
            NativeParam::Address(state.to),
            NativeParam::Integer(state.amount as i128),
        ])
    }
}

/// Arguments for the native `transfer` method: a single array of states.
pub fn transfer_states(states: &[State]) -> Vec<NativeParam> {
    vec![NativeParam::Array(states.iter().map(NativeParam::from).collect())]
}

/// Build the invoke payload for `method` on `contract`. Arguments are pushed
/// in the order given.
pub fn encode_invoke_payload(
    contract: &Address,
    version: u8,
    method: &str,
    args: &[NativeParam],
) -> Result<Vec<u8>, EncodingError> {
    if method.is_empty() {
        return Err(EncodingError::EmptyMethod);
    }
    let mut b = ProgramBuilder::new();
    for arg in args {
        arg.emit(&mut b, 1)?;
    }
    b.push_bytes(method.as_bytes())
        .push_bytes(contract.as_bytes())
        .push_int(version as i128)
        .emit(opcode::SYSCALL)
        .push_bytes(NATIVE_INVOKE_NAME.as_bytes());
    Ok(b.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAYER: &str = "ANH5bHrrt111XwNEnuPZj6u95Dd6u7G4D6";
    const RECEIVER: &str = "AKFMnJT1u5pyPhzGRuauD1KkyUvqjQsmGs";
    const TRANSFER_PAYLOAD: &str = "00c66b144756c9dd829b2142883adbe1ae4f8689a1f673e96a7cc814261b18069e80f351a202cd1d230641dfa450b83b6a7cc8516a7cc86c51c1087472616e736665721400000000000000000000000000000000000000010068164f6e746f6c6f67792e4e61746976652e496e766f6b65";

    #[test]
    fn transfer_payload_known_vector() {
        let states = [State {
            from: PAYER.parse().unwrap(),
            to: RECEIVER.parse().unwrap(),
            amount: 1,
        }];
        let payload =
            encode_invoke_payload(&Address::ONT_CONTRACT, 0, "transfer", &transfer_states(&states))
                .unwrap();
        assert_eq!(hex::encode(&payload), TRANSFER_PAYLOAD);
        assert_eq!(payload.len(), 0x71);
    }

    #[test]
    fn empty_method_rejected() {
        assert_eq!(
            encode_invoke_payload(&Address::ONT_CONTRACT, 0, "", &[]).unwrap_err(),
            EncodingError::EmptyMethod
        );
    }

    #[test]
    fn no_args_payload_tail() {
        let payload = encode_invoke_payload(&Address::ONG_CONTRACT, 0, "name", &[]).unwrap();
        assert_eq!(&payload[..5], &[0x04, b'n', b'a', b'm', b'e']);
        assert_eq!(payload[5], 0x14);
        assert_eq!(payload[26], 0x00);
        assert_eq!(payload[27], opcode::SYSCALL);
        assert_eq!(&payload[29..], NATIVE_INVOKE_NAME.as_bytes());
    }

    #[test]
    fn array_elements_pushed_in_reverse() {
        let mut b = ProgramBuilder::new();
        NativeParam::Array(vec![NativeParam::Integer(1), NativeParam::Integer(2)])
            .emit(&mut b, 1)
            .unwrap();
        assert_eq!(b.into_bytes(), vec![0x52, 0x51, 0x52, opcode::PACK]);
    }

    #[test]
    fn nesting_depth_bounded() {
        let mut param = NativeParam::Integer(1);
        for _ in 0..MAX_PARAM_DEPTH {
            param = NativeParam::Array(vec![param]);
        }
        assert_eq!(
            encode_invoke_payload(&Address::ONT_CONTRACT, 0, "m", &[param]).unwrap_err(),
            EncodingError::NestingTooDeep(MAX_PARAM_DEPTH)
        );

        let mut ok = NativeParam::Integer(1);
        for _ in 0..MAX_PARAM_DEPTH - 1 {
            ok = NativeParam::Array(vec![ok]);
        }
        assert!(encode_invoke_payload(&Address::ONT_CONTRACT, 0, "m", &[ok]).is_ok());
    }

    #[test]
    fn typed_json_scalars() {
        assert_eq!(
            NativeParam::from_typed_json(&json!({"type": "Integer", "value": 42})).unwrap(),
            NativeParam::Integer(42)
        );
        assert_eq!(
            NativeParam::from_typed_json(&json!({"type": "Integer", "value": "-7"})).unwrap(),
            NativeParam::Integer(-7)
        );
        assert_eq!(
            NativeParam::from_typed_json(&json!({"type": "Boolean", "value": true})).unwrap(),
            NativeParam::Bool(true)
        );
        assert_eq!(
            NativeParam::from_typed_json(&json!({"type": "ByteArray", "value": "abcd"})).unwrap(),
            NativeParam::Bytes(vec![0xab, 0xcd])
        );
        assert_eq!(
            NativeParam::from_typed_json(&json!({"type": "Address", "value": PAYER})).unwrap(),
            NativeParam::Address(PAYER.parse().unwrap())
        );
    }

    #[test]
    fn typed_json_nested() {
        let value = json!({"type": "Array", "value": [
            {"type": "Struct", "value": [
                {"type": "String", "value": "a"},
                {"type": "Integer", "value": 1}
            ]}
        ]});
        assert_eq!(
            NativeParam::from_typed_json(&value).unwrap(),
            NativeParam::Array(vec![NativeParam::Struct(vec![
                NativeParam::String("a".into()),
                NativeParam::Integer(1),
            ])])
        );
    }

    #[test]
    fn typed_json_errors() {
        assert_eq!(
            NativeParam::from_typed_json(&json!({"type": "Float", "value": 1.5})).unwrap_err(),
            EncodingError::UnsupportedType("Float".into())
        );
        assert_eq!(
            NativeParam::from_typed_json(&json!(5)).unwrap_err(),
            EncodingError::UnsupportedType("number".into())
        );
        assert!(matches!(
            NativeParam::from_typed_json(&json!({"type": "Integer", "value": 1.5})),
            Err(EncodingError::InvalidValue(_))
        ));
        assert!(matches!(
            NativeParam::from_typed_json(
                &json!({"type": "Integer", "value": "999999999999999999999999999999999999999999"})
            ),
            Err(EncodingError::IntegerOutOfRange(_))
        ));
        assert!(matches!(
            NativeParam::from_typed_json(&json!({"type": "Address", "value": "nope"})),
            Err(EncodingError::InvalidValue(_))
        ));
        assert!(matches!(
            NativeParam::from_typed_json(&json!({"type": "ByteArray", "value": "zz"})),
            Err(EncodingError::InvalidValue(_))
        ));
    }
}
