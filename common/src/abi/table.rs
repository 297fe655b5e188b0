use alloy_dyn_abi::{FunctionExt, JsonAbiExt};
use alloy_json_abi::{self as json, JsonAbi, StateMutability};
use std::collections::{BTreeMap, HashMap};

use super::{
    codec::{self, from_sol_values, to_sol_values},
    AbiError, AbiValue, ParamType,
};
use crate::crypto::Hash;

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
    /// Only meaningful for event inputs
    pub indexed: bool,
}

impl Param {
    fn from_json(param: &json::Param) -> Result<Self, AbiError> {
        Ok(Self {
            name: param.name.clone(),
            kind: ParamType::parse(&param.ty)?,
            indexed: false,
        })
    }

    fn from_event_json(param: &json::EventParam) -> Result<Self, AbiError> {
        Ok(Self {
            name: param.name.clone(),
            kind: ParamType::parse(&param.ty)?,
            indexed: param.indexed,
        })
    }
}

fn params<'a, T: 'a>(
    raw: impl IntoIterator<Item = &'a T>,
    convert: fn(&T) -> Result<Param, AbiError>,
) -> Result<Vec<Param>, AbiError> {
    raw.into_iter().map(convert).collect()
}

fn kinds(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|p| p.kind).collect()
}

fn codec_error(context: &str, e: alloy_dyn_abi::Error) -> AbiError {
    AbiError::InvalidEncoding(format!("{}: {}", context, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl From<StateMutability> for Mutability {
    fn from(value: StateMutability) -> Self {
        match value {
            StateMutability::Pure => Mutability::Pure,
            StateMutability::View => Mutability::View,
            StateMutability::NonPayable => Mutability::NonPayable,
            StateMutability::Payable => Mutability::Payable,
        }
    }
}

impl Mutability {
    /// Whether calling the method can change state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }
}

/// A callable contract method.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub mutability: Mutability,
    function: json::Function,
}

impl Method {
    fn from_json(function: &json::Function) -> Result<Self, AbiError> {
        Ok(Self {
            name: function.name.clone(),
            inputs: params(&function.inputs, Param::from_json)?,
            outputs: params(&function.outputs, Param::from_json)?,
            mutability: function.state_mutability.into(),
            function: function.clone(),
        })
    }

    pub fn signature(&self) -> String {
        self.function.signature()
    }

    pub fn selector(&self) -> [u8; 4] {
        self.function.selector().0
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let values = to_sol_values(&self.name, &kinds(&self.inputs), args)?;
        self.function
            .abi_encode_input(&values)
            .map_err(|e| codec_error(&self.name, e))
    }

    /// Decode call data, selector included.
    pub fn decode_call(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        match data.get(..4) {
            Some(prefix) if prefix == self.selector() => {
                let values = self
                    .function
                    .abi_decode_input(&data[4..], true)
                    .map_err(|e| codec_error(&self.name, e))?;
                from_sol_values(values)
            }
            Some(prefix) => Err(AbiError::UnknownSelector(hex::encode(prefix))),
            None => Err(AbiError::Truncated {
                needed: 4,
                got: data.len(),
            }),
        }
    }

    pub fn encode_output(&self, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let values = to_sol_values(&self.name, &kinds(&self.outputs), values)?;
        self.function
            .abi_encode_output(&values)
            .map_err(|e| codec_error(&self.name, e))
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let values = self
            .function
            .abi_decode_output(data, true)
            .map_err(|e| codec_error(&self.name, e))?;
        from_sol_values(values)
    }
}

/// An event declaration.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    event: json::Event,
}

impl Event {
    fn from_json(event: &json::Event) -> Result<Self, AbiError> {
        Ok(Self {
            name: event.name.clone(),
            inputs: params(&event.inputs, Param::from_event_json)?,
            event: event.clone(),
        })
    }

    pub fn signature(&self) -> String {
        self.event.signature()
    }

    /// Topic[0] of every log this event emits.
    pub fn id(&self) -> Hash {
        Hash::new(self.event.selector().0)
    }

    /// Log data carrying the non-indexed inputs.
    pub fn encode_data(&self, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let data_kinds: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind)
            .collect();
        codec::encode(&self.name, &data_kinds, values)
    }
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    constructor: json::Constructor,
}

impl Default for Constructor {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            constructor: json::Constructor {
                inputs: Vec::new(),
                state_mutability: StateMutability::NonPayable,
            },
        }
    }
}

impl Constructor {
    fn from_json(constructor: &json::Constructor) -> Result<Self, AbiError> {
        Ok(Self {
            inputs: params(&constructor.inputs, Param::from_json)?,
            constructor: constructor.clone(),
        })
    }

    pub fn encode(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let values = to_sol_values("constructor", &kinds(&self.inputs), args)?;
        self.constructor
            .abi_encode_input(&values)
            .map_err(|e| codec_error("constructor", e))
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let values = self
            .constructor
            .abi_decode_input(data, true)
            .map_err(|e| codec_error("constructor", e))?;
        from_sol_values(values)
    }
}

/// Method, event and constructor schemas of one contract, built from a
/// JSON ABI document.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: BTreeMap<String, Method>,
    by_selector: HashMap<[u8; 4], String>,
    events: BTreeMap<String, Event>,
    constructor: Constructor,
}

impl MethodTable {
    pub fn from_json(document: &str) -> Result<Self, AbiError> {
        let abi = JsonAbi::from_json_str(document).map_err(|e| AbiError::Json(e.to_string()))?;

        let mut table = MethodTable::default();
        for function in abi.functions() {
            let method = Method::from_json(function)?;
            if table.methods.contains_key(&method.name) {
                return Err(AbiError::Json(format!(
                    "overloaded method '{}'",
                    method.signature()
                )));
            }
            table.by_selector.insert(method.selector(), method.name.clone());
            table.methods.insert(method.name.clone(), method);
        }
        for event in abi.events() {
            let event = Event::from_json(event)?;
            table.events.insert(event.name.clone(), event);
        }
        if let Some(constructor) = &abi.constructor {
            table.constructor = Constructor::from_json(constructor)?;
        }

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Loaded method table: {} methods, {} events",
                table.methods.len(),
                table.events.len()
            );
        }

        Ok(table)
    }

    pub fn method(&self, name: &str) -> Result<&Method, AbiError> {
        self.methods
            .get(name)
            .ok_or_else(|| AbiError::UnknownMethod(name.to_string()))
    }

    /// Resolve the method a piece of call data targets.
    pub fn method_for_call(&self, data: &[u8]) -> Result<&Method, AbiError> {
        let prefix = data.get(..4).ok_or(AbiError::Truncated {
            needed: 4,
            got: data.len(),
        })?;
        let mut selector = [0u8; 4];
        selector.copy_from_slice(prefix);
        self.by_selector
            .get(&selector)
            .and_then(|name| self.methods.get(name))
            .ok_or_else(|| AbiError::UnknownSelector(hex::encode(selector)))
    }

    pub fn event(&self, name: &str) -> Result<&Event, AbiError> {
        self.events
            .get(name)
            .ok_or_else(|| AbiError::UnknownEvent(name.to_string()))
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
