//! Dynamic object model walked by the comparison context.
//!
//! There is no runtime reflection to lean on, so every object carries an
//! [`ObjectType`]: a named descriptor table listing its members in declaration
//! order. Objects live behind `Rc` so graphs can share nodes and form cycles;
//! reference identity is pointer identity of that `Rc`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use itertools::Itertools;

use crate::errors::{EquivalencyError, Result};

/// Whether a member is a property (accessor) or a plain data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Internal,
}

/// Getter for a computed member. Allowed to fail.
pub type Getter = Arc<dyn Fn(&ObjectRef) -> std::result::Result<Value, String> + Send + Sync>;

#[derive(Clone)]
enum Accessor {
    Stored,
    Computed(Getter),
}

/// Describes one data member of an [`ObjectType`] and knows how to read it.
#[derive(Clone)]
pub struct MemberInfo {
    name: String,
    declaring_type: String,
    kind: MemberKind,
    visibility: Visibility,
    accessor: Accessor,
}

impl MemberInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Read this member's current value off `instance`.
    ///
    /// Non-object instances have no members, so reading from them yields
    /// `Null`, the same as a stored member that was never assigned.
    pub fn read(&self, instance: &Value) -> Result<Value> {
        let Value::Object(obj) = instance else {
            return Ok(Value::Null);
        };
        match &self.accessor {
            Accessor::Stored => Ok(obj.get(&self.name).unwrap_or(Value::Null)),
            Accessor::Computed(getter) => getter(obj).map_err(|message| EquivalencyError::Reflection {
                member: format!("{}.{}", self.declaring_type, self.name),
                message,
            }),
        }
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .finish()
    }
}

impl PartialEq for MemberInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.declaring_type == other.declaring_type && self.kind == other.kind
    }
}

/// A named list of members. Shared between all instances of the type.
#[derive(Debug)]
pub struct ObjectType {
    name: String,
    members: Vec<MemberInfo>,
}

impl ObjectType {
    pub fn builder(name: impl Into<String>) -> ObjectTypeBuilder {
        ObjectTypeBuilder { name: name.into(), members: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All data members in declaration order.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Allocate a fresh instance with every stored member unset.
    pub fn instantiate(self: &Arc<Self>) -> ObjectRef {
        Rc::new(Object { ty: Arc::clone(self), slots: RefCell::new(HashMap::new()) })
    }
}

pub struct ObjectTypeBuilder {
    name: String,
    members: Vec<MemberInfo>,
}

impl ObjectTypeBuilder {
    fn push(mut self, name: &str, kind: MemberKind, visibility: Visibility, accessor: Accessor) -> Self {
        self.members.push(MemberInfo {
            name: name.to_string(),
            declaring_type: self.name.clone(),
            kind,
            visibility,
            accessor,
        });
        self
    }

    pub fn property(self, name: &str) -> Self {
        self.push(name, MemberKind::Property, Visibility::Public, Accessor::Stored)
    }

    pub fn field(self, name: &str) -> Self {
        self.push(name, MemberKind::Field, Visibility::Public, Accessor::Stored)
    }

    pub fn internal_property(self, name: &str) -> Self {
        self.push(name, MemberKind::Property, Visibility::Internal, Accessor::Stored)
    }

    pub fn internal_field(self, name: &str) -> Self {
        self.push(name, MemberKind::Field, Visibility::Internal, Accessor::Stored)
    }

    /// A public property whose value is produced by `getter` on every read.
    pub fn computed<F>(self, name: &str, getter: F) -> Self
    where
        F: Fn(&ObjectRef) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.push(name, MemberKind::Property, Visibility::Public, Accessor::Computed(Arc::new(getter)))
    }

    pub fn build(self) -> Arc<ObjectType> {
        Arc::new(ObjectType { name: self.name, members: self.members })
    }
}

pub type ObjectRef = Rc<Object>;

/// An instance of an [`ObjectType`]. Slots are interior-mutable so that a
/// graph can be wired up (including back references) after allocation.
pub struct Object {
    ty: Arc<ObjectType>,
    slots: RefCell<HashMap<String, Value>>,
}

impl Object {
    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.ty
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots.borrow().get(name).cloned()
    }

    /// Assign a stored member. Unknown or computed members are rejected.
    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        match self.ty.member(name) {
            Some(MemberInfo { accessor: Accessor::Stored, .. }) => {
                self.slots.borrow_mut().insert(name.to_string(), value);
                Ok(())
            }
            _ => Err(EquivalencyError::UnknownMember {
                type_name: self.ty.name.clone(),
                member: name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Object {
    // Slots are not printed: graphs may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object<{}>", self.ty.name)
    }
}

/// Runtime type of a [`Value`].
#[derive(Debug, Clone)]
pub enum Type {
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Object(Arc<ObjectType>),
}

impl Type {
    /// Members declared by this type; scalars and sequences have none.
    pub fn members(&self) -> &[MemberInfo] {
        match self {
            Type::Object(ty) => ty.members(),
            _ => &[],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Float => "float",
            Type::String => "string",
            Type::Sequence => "sequence",
            Type::Object(ty) => ty.name(),
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Object(a), Type::Object(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<[Value]>),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// `None` for an absent value.
    pub fn runtime_type(&self) -> Option<Type> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::String,
            Value::List(_) => Type::Sequence,
            Value::Object(obj) => Type::Object(Arc::clone(&obj.ty)),
        })
    }

    /// Reference identity. Scalars and `Null` are never the same reference.
    pub fn same_reference(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Build a graph from JSON. Each JSON object becomes an instance of an
    /// anonymous type whose public properties are the object's keys.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::list(items.iter().map(Value::from_json)),
            serde_json::Value::Object(map) => {
                let ty = map
                    .keys()
                    .fold(ObjectType::builder("object"), |b, key| b.property(key))
                    .build();
                let obj = ty.instantiate();
                obj.slots
                    .borrow_mut()
                    .extend(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))));
                Value::Object(obj)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<null>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            // Only the shape: members may point back at this object.
            Value::Object(obj) => write!(
                f,
                "{} {{{}}}",
                obj.ty.name,
                obj.ty.members().iter().map(MemberInfo::name).join(", ")
            ),
        }
    }
}
