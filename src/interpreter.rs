use crate::util::Log;
use crate::value::{apply_binary, apply_unary, construct, make_number, Constructed};
use crate::{
    Entity, HostIo, ProgramState, RuntimeError, TokenKind, TreeNode, TypeName, Value,
};
use once_cell::unsync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::io::Write;

/// Host input and output wired to the process standard streams.
pub struct StdIo;

impl HostIo for StdIo {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(bytes);
        let _ = handle.flush();
    }
}

#[derive(Debug, Default)]
/// In-memory host input and output, used by tests and embedders that want
/// to capture a program's output.
pub struct BufferIo {
    input: VecDeque<String>,
    output: Vec<u8>,
}

impl BufferIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|line| line.to_string()).collect(),
            output: Vec::new(),
        }
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl HostIo for BufferIo {
    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }
}

/// The fixed denominator of `random` results. Highly composite, so reduced
/// fractions keep friendly denominators.
const RANDOM_DENOMINATOR: i64 = 12_252_240;

/// A tree-walking evaluator.
///
/// Walks the syntax tree against a fresh [ProgramState], binding statements
/// to state mutations and expressions to values, and performing all input
/// and output through the supplied [HostIo]. A runtime error prints its one
/// line diagnostic followed by `Execution terminated.` and stops the walk;
/// the state is append only, so no cleanup pass is needed.
pub struct Interpreter<'io> {
    state: ProgramState,
    rng: StdRng,
    io: &'io mut dyn HostIo,
    debugger: OnceCell<Log<&'static str>>,
}

impl<'io> Interpreter<'io> {
    pub fn new(io: &'io mut dyn HostIo) -> Self {
        Self {
            state: ProgramState::new(),
            rng: StdRng::from_entropy(),
            io,
            debugger: OnceCell::new(),
        }
    }

    /// An interpreter whose `random` stream is reproducible.
    pub fn with_seed(io: &'io mut dyn HostIo, seed: u64) -> Self {
        Self {
            state: ProgramState::new(),
            rng: StdRng::seed_from_u64(seed),
            io,
            debugger: OnceCell::new(),
        }
    }

    /// Set a log label to debug the evaluation. At the Verbose level the
    /// final program state is dumped after the run.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    /// Execute a whole program tree.
    pub fn run(&mut self, tree: &TreeNode) -> Result<(), RuntimeError> {
        let result = self.execute(tree);
        if let Err(err) = &result {
            self.io.write(err.message.as_bytes());
            self.io.write(b"\n");
            self.io.write(b"Execution terminated.\n");
        }

        #[cfg(debug_assertions)]
        if let Some(log) = self.debugger.get() {
            if log.order() >= Log::Verbose(()).order() {
                println!("{}", self.state.dump());
            }
        }

        result
    }

    /// Generate output and state changes for one statement node.
    fn execute(&mut self, node: &TreeNode) -> Result<(), RuntimeError> {
        match node.name() {
            "Program" => self.execute(child(node, 0)?),
            "Block" => {
                for statement in node.children() {
                    self.execute(statement)?;
                }
                Ok(())
            }
            "PrintStatement" => {
                let mut newline = true;
                for item in node.children() {
                    if let Some((TokenKind::Symbol, "...")) = item.as_leaf() {
                        newline = false;
                        break;
                    }
                    let value = self.get_value(item)?;
                    self.io.write(value.to_string().as_bytes());
                    self.io.write(b" ");
                }
                if newline {
                    self.io.write(b"\n");
                }
                Ok(())
            }
            "SetStatement" => {
                let target = self.assignment_target(child(node, 0)?)?;
                let address = match self.evaluate(child(node, 1)?)? {
                    // an lvalue on the right shares its storage
                    Entity::LValue(source) => match self.state.var_address(source)? {
                        Some(address) => address,
                        None => {
                            return Err(RuntimeError::new(
                                "Trying to get the value of uninitialized variable".to_string(),
                            ))
                        }
                    },
                    Entity::Value(value) => self.state.memorize(value),
                };
                self.state.set_var_address(target, address)
            }
            "IncStatement" => {
                let target = match self.evaluate(child(node, 0)?)? {
                    Entity::LValue(id) => id,
                    Entity::Value(_) => {
                        return Err(RuntimeError::new(
                            "Trying to increment value or reserved name".to_string(),
                        ))
                    }
                };
                if self.state.var_address(target)?.is_none() {
                    return Err(RuntimeError::new(
                        "Trying to increment uninitialized variable".to_string(),
                    ));
                }
                let old_value = self.state.get_value(&Entity::LValue(target))?;
                let new_value = match old_value.increment() {
                    Some(Ok(value)) => value,
                    Some(Err(_)) => {
                        return Err(RuntimeError::new(format!(
                            "Integer overflow while incrementing {}",
                            old_value
                        )))
                    }
                    None => {
                        return Err(RuntimeError::new(format!(
                            "Cannot increment {}",
                            old_value.type_name()
                        )))
                    }
                };
                let address = self.state.memorize(new_value);
                self.state.set_var_address(target, address)
            }
            "InputStatement" => {
                let target = self.assignment_target(child(node, 0)?)?;
                let input_type = if node.children().len() > 1 {
                    match self.get_value(child(node, 1)?)? {
                        Value::Type(type_name) => type_name,
                        other => {
                            return Err(RuntimeError::new(format!(
                                "Cannot input as {} because it is not a type",
                                other
                            )))
                        }
                    }
                } else {
                    TypeName::String
                };
                let line = match self.io.read_line() {
                    Some(line) => line,
                    None => {
                        return Err(RuntimeError::new(
                            "Reached end of input".to_string(),
                        ))
                    }
                };
                let value = match construct(input_type, &[Value::String(line)]) {
                    Ok(Constructed::Value(value)) => value,
                    Ok(Constructed::Alloc(_)) => {
                        return Err(RuntimeError::new(
                            "Cannot input as Array".to_string(),
                        ))
                    }
                    Err(err) => return Err(RuntimeError::new(err.message)),
                };
                let address = self.state.memorize(value);
                self.state.set_var_address(target, address)
            }
            "WhileStatement" => {
                let condition = child(node, 0)?;
                let block = child(node, 1)?;
                loop {
                    let flag = self.get_value(condition)?;
                    if !expect_boolean(&flag)? {
                        break;
                    }
                    self.execute(block)?;
                }
                Ok(())
            }
            "ForStatement" => {
                let children = node.children();
                if children.len() < 4 {
                    return Err(RuntimeError::new(
                        "Trying to execute malformed ForStatement node".to_string(),
                    ));
                }
                let loop_var = children[0].clone();
                let start = children[1].clone();
                let finish = children[2].clone();
                let block = children[children.len() - 1].clone();
                // the loop desugars to set / test / execute / inc
                let initializer =
                    TreeNode::internal_with("SetStatement", vec![loop_var.clone(), start]);
                let updater = TreeNode::internal_with("IncStatement", vec![loop_var.clone()]);
                let condition = TreeNode::internal_with(
                    "Expression",
                    vec![loop_var, TreeNode::leaf(TokenKind::Operator, "<="), finish],
                );
                self.execute(&initializer)?;
                loop {
                    let flag = self.get_value(&condition)?;
                    if !expect_boolean(&flag)? {
                        break;
                    }
                    self.execute(&block)?;
                    self.execute(&updater)?;
                }
                Ok(())
            }
            "IfStatement" => {
                let children = node.children();
                let mut index = 0;
                while index < children.len() {
                    if index == children.len() - 1 {
                        // a lone trailing block is the else branch
                        self.execute(&children[index])?;
                        break;
                    }
                    let flag = self.get_value(&children[index])?;
                    if expect_boolean(&flag)? {
                        self.execute(&children[index + 1])?;
                        break;
                    }
                    index += 2;
                }
                Ok(())
            }
            other => Err(RuntimeError::new(format!(
                "Trying to execute unrecognized entity: {}",
                other
            ))),
        }
    }

    /// Evaluate an expression node to an lvalue or a value.
    fn evaluate(&mut self, node: &TreeNode) -> Result<Entity, RuntimeError> {
        if let Some((kind, text)) = node.as_leaf() {
            let owned = text.to_string();
            return self.evaluate_leaf(kind, &owned);
        }
        match node.name() {
            "Expression" => match node.children() {
                [single] => self.evaluate(single),
                [operator, operand] => {
                    let operator = leaf_text(operator)?.to_string();
                    let value = self.get_value(operand)?;
                    Ok(Entity::Value(apply_unary(&operator, &value)?))
                }
                [lhs_node, operator, rhs_node] => {
                    let lhs = self.get_value(lhs_node)?;
                    let operator = leaf_text(operator)?.to_string();
                    // binary operators are strict; no short circuit
                    let rhs = self.get_value(rhs_node)?;
                    Ok(Entity::Value(apply_binary(&operator, &lhs, &rhs)?))
                }
                _ => Err(RuntimeError::new(
                    "Trying to evaluate malformed Expression node".to_string(),
                )),
            },
            "NameThing" => self.evaluate_name_thing(node),
            other => Err(RuntimeError::new(format!(
                "Trying to evaluate unrecognized entity: {}",
                other
            ))),
        }
    }

    fn evaluate_leaf(&mut self, kind: TokenKind, text: &str) -> Result<Entity, RuntimeError> {
        let type_name = match kind {
            TokenKind::Keyword if text == "random" => {
                let numerator = self.rng.gen_range(0..RANDOM_DENOMINATOR);
                let value = make_number(numerator as i128, RANDOM_DENOMINATOR as i128)
                    .map_err(|_| {
                        RuntimeError::new("random produced an unrepresentable fraction".to_string())
                    })?;
                return Ok(Entity::Value(value));
            }
            TokenKind::Integer => TypeName::Integer,
            TokenKind::Boolean => TypeName::Boolean,
            TokenKind::Character => TypeName::Character,
            TokenKind::String => TypeName::String,
            other => {
                return Err(RuntimeError::new(format!(
                    "Trying to evaluate unrecognized entity: {}",
                    other.name()
                )))
            }
        };
        let delimiter = type_name.delimiter();
        let mut body = text;
        if !delimiter.is_empty() {
            body = body.strip_prefix(delimiter).unwrap_or(body);
            body = body.strip_suffix(delimiter).unwrap_or(body);
        }
        match construct(type_name, &[Value::String(body.to_string())]) {
            Ok(Constructed::Value(value)) => Ok(Entity::Value(value)),
            Ok(Constructed::Alloc(_)) => Err(RuntimeError::new(format!(
                "Unexpected allocation while reading a {} literal",
                type_name.name()
            ))),
            Err(err) => Err(RuntimeError::new(err.message)),
        }
    }

    /// A base name followed by accessors, applied left to right: call
    /// parentheses construct values from built-in types, square braces
    /// subscript or slice the current value.
    fn evaluate_name_thing(&mut self, node: &TreeNode) -> Result<Entity, RuntimeError> {
        let base = child(node, 0)?;
        let name = match base.as_leaf() {
            Some((TokenKind::Name, name)) => name,
            _ => {
                return Err(RuntimeError::new(
                    "Trying to evaluate malformed NameThing node".to_string(),
                ))
            }
        };
        let mut entity = match TypeName::from_name(name) {
            Some(type_name) => Entity::Value(Value::Type(type_name)),
            None => Entity::LValue(self.state.get_var_id(name)),
        };
        for accessor in &node.children()[1..] {
            let current = self.state.get_value(&entity)?;
            match accessor.name() {
                "Parentheses" => match current {
                    Value::Type(type_name) => {
                        let mut args = Vec::new();
                        for argument in accessor.children() {
                            args.push(self.get_value(argument)?);
                        }
                        entity = match construct(type_name, &args) {
                            Ok(Constructed::Value(value)) => Entity::Value(value),
                            Ok(Constructed::Alloc(size)) => {
                                let base_id = self.state.create_variables(size);
                                Entity::Value(Value::Array {
                                    size,
                                    base: base_id,
                                })
                            }
                            Err(_) => {
                                let given: Vec<&str> =
                                    args.iter().map(|arg| arg.type_name()).collect();
                                return Err(RuntimeError::new(format!(
                                    "Wrong argument number or type(s) for {}(): {}",
                                    type_name.name(),
                                    given.join(", ")
                                )));
                            }
                        };
                    }
                    other => {
                        return Err(RuntimeError::new(format!(
                            "Trying to instantiate object of type {}",
                            other.type_name()
                        )))
                    }
                },
                "SquareBraces" => {
                    if let Value::Type(type_name) = current {
                        return Err(RuntimeError::new(format!(
                            "Trying to subscript built-in class {}",
                            type_name.name()
                        )));
                    }
                    let indices = accessor.children();
                    entity = match indices.len() {
                        1 => {
                            let index = self.get_value(&indices[0])?;
                            self.subscript(&current, &index)?
                        }
                        2 => {
                            let start = self.get_value(&indices[0])?;
                            let stop = self.get_value(&indices[1])?;
                            Entity::Value(self.section(&current, &start, &stop)?)
                        }
                        _ => {
                            return Err(RuntimeError::new(
                                "Trying to evaluate malformed SquareBraces node".to_string(),
                            ))
                        }
                    };
                }
                other => {
                    return Err(RuntimeError::new(format!(
                        "Unsupported NameThing child: {}",
                        other
                    )))
                }
            }
        }
        Ok(entity)
    }

    /// One-based subscript. Arrays yield the lvalue of the addressed slot,
    /// strings yield the character by value.
    fn subscript(&mut self, current: &Value, index: &Value) -> Result<Entity, RuntimeError> {
        match (current, index) {
            (Value::String(s), Value::Integer(i)) => {
                let characters: Vec<char> = s.chars().collect();
                if *i >= 1 && (*i as usize) <= characters.len() {
                    Ok(Entity::Value(Value::Character(
                        characters[(*i as usize) - 1],
                    )))
                } else {
                    Err(RuntimeError::new(format!("Subscript out of bounds: {}", i)))
                }
            }
            (Value::Array { size, base }, Value::Integer(i)) => {
                if *i >= 1 && (*i as usize) <= *size {
                    Ok(Entity::LValue(base + (*i as usize) - 1))
                } else {
                    Err(RuntimeError::new(format!("Subscript out of bounds: {}", i)))
                }
            }
            (Value::String(_) | Value::Array { .. }, other) => Err(RuntimeError::new(format!(
                "Illegal subscript for {}: {}",
                current.type_name(),
                other
            ))),
            _ => Err(RuntimeError::new(format!(
                "{} object is not subscriptable",
                current.type_name()
            ))),
        }
    }

    /// One-based inclusive range, clamped to the value's length.
    fn section(
        &mut self,
        current: &Value,
        start: &Value,
        stop: &Value,
    ) -> Result<Value, RuntimeError> {
        match (current, start, stop) {
            (Value::String(s), Value::Integer(a), Value::Integer(b)) => {
                let characters: Vec<char> = s.chars().collect();
                let first = (*a).max(1);
                let last = (*b).min(characters.len() as i64);
                if first > last {
                    Ok(Value::String(String::new()))
                } else {
                    let sliced: String = characters[(first as usize) - 1..last as usize]
                        .iter()
                        .collect();
                    Ok(Value::String(sliced))
                }
            }
            (Value::String(_), a, b) => Err(RuntimeError::new(format!(
                "Illegal section bounds for {}: {} and {}",
                current.type_name(),
                a,
                b
            ))),
            _ => Err(RuntimeError::new(format!(
                "{} object does not allow sections",
                current.type_name()
            ))),
        }
    }

    /// Evaluate a node and resolve the resulting entity to a value.
    fn get_value(&mut self, node: &TreeNode) -> Result<Value, RuntimeError> {
        let entity = self.evaluate(node)?;
        self.state.get_value(&entity)
    }

    fn assignment_target(&mut self, node: &TreeNode) -> Result<usize, RuntimeError> {
        match self.evaluate(node)? {
            Entity::LValue(id) => Ok(id),
            Entity::Value(_) => Err(RuntimeError::new(
                "Trying to assign to value or reserved name".to_string(),
            )),
        }
    }
}

fn child<'t>(node: &'t TreeNode, index: usize) -> Result<&'t TreeNode, RuntimeError> {
    node.children().get(index).ok_or_else(|| {
        RuntimeError::new(format!(
            "Trying to execute malformed {} node",
            node.name()
        ))
    })
}

fn leaf_text(node: &TreeNode) -> Result<&str, RuntimeError> {
    match node.as_leaf() {
        Some((_, text)) => Ok(text),
        None => Err(RuntimeError::new(
            "Trying to evaluate malformed Expression node".to_string(),
        )),
    }
}

fn expect_boolean(value: &Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Boolean(flag) => Ok(*flag),
        other => Err(RuntimeError::new(format!(
            "Given non-boolean as condition expression: {:?}",
            other
        ))),
    }
}
