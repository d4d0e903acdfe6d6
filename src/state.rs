use crate::{Entity, RuntimeError, TypeName, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The type recorded on a variable cell. Assignments are gated on it: the
/// cell only accepts values its declared type agrees with.
pub enum DeclaredType {
    /// Accepts every value variant.
    Any,
    Of(TypeName),
}

impl DeclaredType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            DeclaredType::Any => true,
            DeclaredType::Of(type_name) => value.type_name() == type_name.name(),
        }
    }

    fn name(&self) -> &str {
        match self {
            DeclaredType::Any => "Object",
            DeclaredType::Of(type_name) => type_name.name(),
        }
    }
}

/// The mutable state of a running program.
///
/// Addressing is two level: the symbol table maps source names to variable
/// ids, each variable cell holds an address into value memory (or nothing,
/// while uninitialized) together with its declared type. Value memory is
/// append only. Addresses below [RESERVED_SIZE](Self::RESERVED_SIZE) form a
/// sparse reserved region interning the booleans and the small integers, so
/// equal small values are shared by address for the whole run.
pub struct ProgramState {
    symbols: HashMap<String, usize>,
    variables: Vec<(Option<usize>, DeclaredType)>,
    memory: Vec<Value>,
    reserved: BTreeMap<usize, Value>,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramState {
    pub const RESERVED_SIZE: usize = 514;

    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            variables: Vec::new(),
            memory: Vec::new(),
            reserved: BTreeMap::new(),
        }
    }

    /// The id for the given variable name, creating a fresh uninitialized
    /// variable on first reference.
    pub fn get_var_id(&mut self, name: &str) -> usize {
        if let Some(id) = self.symbols.get(name) {
            return *id;
        }
        let id = self.create_variable();
        self.symbols.insert(name.to_string(), id);
        id
    }

    /// Create a new uninitialized variable and return its id.
    pub fn create_variable(&mut self) -> usize {
        self.create_variable_typed(DeclaredType::Any)
    }

    pub fn create_variable_typed(&mut self, declared: DeclaredType) -> usize {
        let id = self.variables.len();
        self.variables.push((None, declared));
        id
    }

    /// Create a block of new variables and return the first one's id.
    pub fn create_variables(&mut self, count: usize) -> usize {
        let start = self.variables.len();
        for _ in 0..count {
            self.variables.push((None, DeclaredType::Any));
        }
        start
    }

    pub fn var_address(&self, id: usize) -> Result<Option<usize>, RuntimeError> {
        match self.variables.get(id) {
            Some((address, _)) => Ok(*address),
            None => Err(RuntimeError::new(format!("no variable with id v{}", id))),
        }
    }

    pub fn var_type(&self, id: usize) -> Result<DeclaredType, RuntimeError> {
        match self.variables.get(id) {
            Some((_, declared)) => Ok(*declared),
            None => Err(RuntimeError::new(format!("no variable with id v{}", id))),
        }
    }

    /// Point the variable cell at the given address, provided the value
    /// stored there fits the cell's declared type.
    pub fn set_var_address(&mut self, id: usize, address: usize) -> Result<(), RuntimeError> {
        let declared = self.var_type(id)?;
        let value = self.recall(address)?;
        if !declared.accepts(value) {
            return Err(RuntimeError::new(format!(
                "Cannot store {} in a variable declared {}",
                value.type_name(),
                declared.name()
            )));
        }
        self.variables[id] = (Some(address), declared);
        Ok(())
    }

    /// Place the value in memory and return its address. The booleans and
    /// integers in `[-256, 256)` intern into stable reserved addresses;
    /// everything else is appended to the growable region.
    pub fn memorize(&mut self, value: Value) -> usize {
        let reserved_address = match &value {
            Value::Boolean(false) => Some(0),
            Value::Boolean(true) => Some(1),
            Value::Integer(n) if (-256..256).contains(n) => {
                if *n >= 0 {
                    Some((*n * 2 + 2) as usize)
                } else {
                    Some((-*n * 2 + 1) as usize)
                }
            }
            _ => None,
        };
        match reserved_address {
            Some(address) => {
                self.reserved.entry(address).or_insert(value);
                address
            }
            None => {
                let address = self.memory.len() + Self::RESERVED_SIZE;
                self.memory.push(value);
                address
            }
        }
    }

    /// The value at the given address.
    pub fn recall(&self, address: usize) -> Result<&Value, RuntimeError> {
        if address < Self::RESERVED_SIZE {
            self.reserved.get(&address).ok_or_else(|| {
                RuntimeError::new(format!("nothing interned at reserved address a{}", address))
            })
        } else {
            self.memory.get(address - Self::RESERVED_SIZE).ok_or_else(|| {
                RuntimeError::new(format!("nothing stored at address a{}", address))
            })
        }
    }

    /// Resolve an entity to a value: an lvalue goes through its cell's
    /// address, a value is returned unchanged.
    pub fn get_value(&self, entity: &Entity) -> Result<Value, RuntimeError> {
        match entity {
            Entity::LValue(id) => match self.var_address(*id)? {
                Some(address) => Ok(self.recall(address)?.clone()),
                None => Err(RuntimeError::new(
                    "Trying to get the value of uninitialized variable".to_string(),
                )),
            },
            Entity::Value(value) => Ok(value.clone()),
        }
    }

    /// Render the full state: symbol table, variable cells, reserved
    /// memory, and value memory.
    pub fn dump(&self) -> String {
        let mut writer = String::new();
        let _ = writeln!(writer, "{}", "-".repeat(70));
        let _ = writeln!(writer);
        let _ = writeln!(writer, "SYMBOL TABLE:");
        let mut symbols: Vec<(&String, &usize)> = self.symbols.iter().collect();
        symbols.sort_by_key(|(_, id)| **id);
        for (name, id) in symbols {
            let _ = writeln!(writer, "{:>8}  v{}", name, id);
        }
        let _ = writeln!(writer);
        let _ = writeln!(writer, "VARIABLES:");
        for (id, (address, declared)) in self.variables.iter().enumerate() {
            match address {
                Some(address) => {
                    let _ = writeln!(
                        writer,
                        "{:>8}  {:<10}  a{}",
                        format!("v{}", id),
                        declared.name(),
                        address
                    );
                }
                None => {
                    let _ = writeln!(writer, "{:>8}  -", format!("v{}", id));
                }
            }
        }
        let _ = writeln!(writer);
        let _ = writeln!(writer, "RESERVED MEMORY:");
        for (address, value) in &self.reserved {
            let _ = writeln!(writer, "{:>8}  {:?}", format!("a{}", address), value);
        }
        let _ = writeln!(writer);
        let _ = writeln!(writer, "MEMORY:");
        for (offset, value) in self.memory.iter().enumerate() {
            let address = offset + Self::RESERVED_SIZE;
            let _ = writeln!(writer, "{:>8}  {:?}", format!("a{}", address), value);
        }
        writer
    }
}
