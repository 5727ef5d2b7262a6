//! 类型描述
//!
//! 运行时反射由显式描述取代：每个可注入类型实现 [`Injectable::describe`]，
//! 通过 [`TypeDescriptorBuilder`] 声明构造函数、字段、属性、注入方法以及基类型。
//! 声明顺序就是稳定的排序键。

use std::any::Any;
use std::sync::Arc;

use super::context::DependencyContext;
use super::marker::{Dependency, DependencyKey, DependencySet, Resolvable};
use super::metadata;
use crate::errors::{DiError, DiResult};

/// 可注入类型
///
/// ```ignore
/// impl Injectable for Enemy {
///     fn describe(d: &mut TypeDescriptorBuilder<Self>) {
///         d.constructor(|(logger,): (Arc<dyn LoggerService>,)| Enemy::new(logger));
///     }
/// }
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    fn describe(descriptor: &mut TypeDescriptorBuilder<Self>);
}

/// 成员种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

type ResolveFn = Arc<dyn Fn(&DependencyContext) -> DiResult<Box<dyn Any + Send>> + Send + Sync>;
type AssignFn<T> = Arc<dyn Fn(&mut T, Box<dyn Any + Send>) + Send + Sync>;
type BuildFn<T> = Arc<dyn Fn(&DependencyContext) -> DiResult<T> + Send + Sync>;
type BaseMembersFn<T> = Box<dyn FnOnce() -> DiResult<InjectableMembers<T>>>;

/// 依赖槽位：解析一组依赖，然后写入目标
pub struct MemberSlot<T> {
    name: &'static str,
    kind: MemberKind,
    declared_by: &'static str,
    dependencies: Vec<DependencyKey>,
    resolve: ResolveFn,
    assign: AssignFn<T>,
}

impl<T> Clone for MemberSlot<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            declared_by: self.declared_by,
            dependencies: self.dependencies.clone(),
            resolve: Arc::clone(&self.resolve),
            assign: Arc::clone(&self.assign),
        }
    }
}

impl<T: 'static> MemberSlot<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// 声明该成员的类型（基类型成员保留基类型名称）
    pub fn declared_by(&self) -> &'static str {
        self.declared_by
    }

    pub fn dependencies(&self) -> &[DependencyKey] {
        &self.dependencies
    }

    pub(crate) fn resolve(&self, context: &DependencyContext) -> DiResult<Box<dyn Any + Send>> {
        (self.resolve)(context)
    }

    pub(crate) fn assign(&self, target: &mut T, value: Box<dyn Any + Send>) {
        (self.assign)(target, value)
    }

    /// 把基类型的槽位投影到派生类型上
    fn lift<D: 'static>(&self, lens: fn(&mut D) -> &mut T) -> MemberSlot<D> {
        let assign = Arc::clone(&self.assign);
        MemberSlot {
            name: self.name,
            kind: self.kind,
            declared_by: self.declared_by,
            dependencies: self.dependencies.clone(),
            resolve: Arc::clone(&self.resolve),
            assign: Arc::new(move |target: &mut D, value: Box<dyn Any + Send>| {
                assign(lens(target), value)
            }),
        }
    }
}

/// 构造函数
pub struct ConstructorSlot<T> {
    index: usize,
    marked: bool,
    parameters: Vec<DependencyKey>,
    build: BuildFn<T>,
}

impl<T> Clone for ConstructorSlot<T> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            marked: self.marked,
            parameters: self.parameters.clone(),
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> ConstructorSlot<T> {
    /// 声明顺序中的位置
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameters(&self) -> &[DependencyKey] {
        &self.parameters
    }

    /// 按顺序解析全部参数并调用构造函数
    pub(crate) fn invoke(&self, context: &DependencyContext) -> DiResult<T> {
        (self.build)(context)
    }
}

/// 一个类型（含基类型链）的全部注入成员，基类型在前
pub struct InjectableMembers<T> {
    pub fields: Vec<MemberSlot<T>>,
    pub properties: Vec<MemberSlot<T>>,
    pub methods: Vec<MemberSlot<T>>,
}

impl<T> Default for InjectableMembers<T> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }
}

impl<T: 'static> InjectableMembers<T> {
    /// 注入顺序：字段、属性、方法
    pub fn iter(&self) -> impl Iterator<Item = &MemberSlot<T>> {
        self.fields
            .iter()
            .chain(self.properties.iter())
            .chain(self.methods.iter())
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.properties.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lift<D: 'static>(&self, lens: fn(&mut D) -> &mut T) -> InjectableMembers<D> {
        InjectableMembers {
            fields: self.fields.iter().map(|slot| slot.lift(lens)).collect(),
            properties: self.properties.iter().map(|slot| slot.lift(lens)).collect(),
            methods: self.methods.iter().map(|slot| slot.lift(lens)).collect(),
        }
    }

    fn append(&mut self, mut other: InjectableMembers<T>) {
        self.fields.append(&mut other.fields);
        self.properties.append(&mut other.properties);
        self.methods.append(&mut other.methods);
    }
}

/// 描述构建器
pub struct TypeDescriptorBuilder<T> {
    type_name: &'static str,
    base: Option<BaseMembersFn<T>>,
    constructors: Vec<ConstructorSlot<T>>,
    members: InjectableMembers<T>,
    read_only: Vec<&'static str>,
    declared: Vec<&'static str>,
    duplicate: Option<&'static str>,
}

impl<T: Injectable> TypeDescriptorBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            base: None,
            constructors: Vec::new(),
            members: InjectableMembers::default(),
            read_only: Vec::new(),
            declared: Vec::new(),
            duplicate: None,
        }
    }

    /// 声明基类型；基类型的成员先于本类型的成员注入
    pub fn extends<B: Injectable>(&mut self, lens: fn(&mut T) -> &mut B) -> &mut Self {
        self.base = Some(Box::new(move || {
            let base = metadata::injectable_members::<B>()?;
            Ok(base.lift(lens))
        }));
        self
    }

    /// 未标记的构造函数，只参与按参数个数的回退选择
    pub fn constructor<D, F>(&mut self, build: F) -> &mut Self
    where
        D: DependencySet,
        F: Fn(D) -> T + Send + Sync + 'static,
    {
        self.push_constructor(false, build)
    }

    /// 带标记的构造函数
    pub fn marked_constructor<D, F>(&mut self, _marker: Dependency, build: F) -> &mut Self
    where
        D: DependencySet,
        F: Fn(D) -> T + Send + Sync + 'static,
    {
        self.push_constructor(true, build)
    }

    pub fn field<V, F>(&mut self, _marker: Dependency, name: &'static str, set: F) -> &mut Self
    where
        V: Resolvable,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push_value_slot(MemberKind::Field, name, set)
    }

    /// 可写属性
    pub fn property<V, F>(&mut self, _marker: Dependency, name: &'static str, set: F) -> &mut Self
    where
        V: Resolvable,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push_value_slot(MemberKind::Property, name, set)
    }

    /// 只读属性：被记录但不参与注入
    pub fn read_only_property(&mut self, _marker: Dependency, name: &'static str) -> &mut Self {
        self.declare(name);
        self.read_only.push(name);
        self
    }

    /// 注入方法：全部参数解析完成后调用一次
    pub fn method<D, F>(&mut self, _marker: Dependency, name: &'static str, call: F) -> &mut Self
    where
        D: DependencySet,
        F: Fn(&mut T, D) + Send + Sync + 'static,
    {
        self.declare(name);
        self.members.methods.push(MemberSlot {
            name,
            kind: MemberKind::Method,
            declared_by: self.type_name,
            dependencies: D::keys(),
            resolve: Arc::new(|context: &DependencyContext| {
                D::resolve_from(context).map(|deps| Box::new(deps) as Box<dyn Any + Send>)
            }),
            assign: Arc::new(move |target: &mut T, value: Box<dyn Any + Send>| {
                if let Ok(deps) = value.downcast::<D>() {
                    call(target, *deps);
                }
            }),
        });
        self
    }

    fn push_constructor<D, F>(&mut self, marked: bool, build: F) -> &mut Self
    where
        D: DependencySet,
        F: Fn(D) -> T + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorSlot {
            index: self.constructors.len(),
            marked,
            parameters: D::keys(),
            build: Arc::new(move |context: &DependencyContext| D::resolve_from(context).map(&build)),
        });
        self
    }

    fn push_value_slot<V, F>(&mut self, kind: MemberKind, name: &'static str, set: F) -> &mut Self
    where
        V: Resolvable,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.declare(name);
        let slot = MemberSlot {
            name,
            kind,
            declared_by: self.type_name,
            dependencies: vec![DependencyKey::of::<V>()],
            resolve: Arc::new(|context: &DependencyContext| {
                context
                    .resolve::<V>()
                    .map(|value| Box::new(value) as Box<dyn Any + Send>)
            }),
            assign: Arc::new(move |target: &mut T, value: Box<dyn Any + Send>| {
                if let Ok(value) = value.downcast::<V>() {
                    set(target, *value);
                }
            }),
        };
        match kind {
            MemberKind::Property => self.members.properties.push(slot),
            _ => self.members.fields.push(slot),
        }
        self
    }

    fn declare(&mut self, name: &'static str) {
        if self.declared.contains(&name) {
            self.duplicate.get_or_insert(name);
        } else {
            self.declared.push(name);
        }
    }

    fn check_markers(&self) -> DiResult<()> {
        match self.duplicate {
            Some(member) => Err(DiError::DuplicateMarker {
                type_name: self.type_name,
                member,
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn read_only_properties(&self) -> &[&'static str] {
        &self.read_only
    }

    /// 沿基类型链收集成员，基类型在前
    pub(crate) fn into_members(self) -> DiResult<InjectableMembers<T>> {
        self.check_markers()?;
        let mut members = match self.base {
            Some(base) => base()?,
            None => InjectableMembers::default(),
        };
        members.append(self.members);
        Ok(members)
    }

    /// 恰好一个带标记的构造函数时选它；否则选参数最多的，并列时取先声明的
    pub(crate) fn into_constructor(self) -> DiResult<ConstructorSlot<T>> {
        self.check_markers()?;
        let mut marked = self.constructors.iter().filter(|c| c.is_marked());
        if let (Some(only), None) = (marked.next(), marked.next()) {
            return Ok(only.clone());
        }

        let mut selected: Option<&ConstructorSlot<T>> = None;
        for candidate in &self.constructors {
            match selected {
                Some(best) if best.arity() >= candidate.arity() => {}
                _ => selected = Some(candidate),
            }
        }
        selected.cloned().ok_or(DiError::NoConstructor {
            type_name: self.type_name,
        })
    }
}
