use tracing::{debug, trace};

use super::resolve::{
    description_of, invalid, parse_bool, reference_of, required_attr, split_prefixed, status_of,
    DataCtx, Resolver, Scope,
};
use super::LoadError;
use crate::model::{
    Augmentation, ElementCountConstraint, Identity, ModuleModel, MustConstraint, NodeKind,
    PathSegment, SchemaNode, SchemaPath,
};
use crate::tree::XmlNode;

/// Map a YIN data definition keyword to the node kind it produces.
fn data_kind(tag: &str) -> Option<NodeKind> {
    Some(match tag {
        "container" => NodeKind::Container,
        "list" => NodeKind::List,
        "leaf" => NodeKind::Leaf,
        "leaf-list" => NodeKind::LeafList,
        "choice" => NodeKind::Choice,
        "case" => NodeKind::Case,
        "anydata" => NodeKind::Anydata,
        "anyxml" => NodeKind::Anyxml,
        "action" => NodeKind::Action,
        "notification" => NodeKind::Notification,
        _ => return None,
    })
}

impl<'a> Resolver<'a> {
    pub fn build_module(&self) -> Result<ModuleModel, LoadError> {
        let main = self.main;
        let scope = Scope::module(main);

        let mut model = ModuleModel::new(main.name.clone(), main.namespace.clone());
        model.prefix = main.prefix.clone();
        model.revision = main.revision;
        model.revisions = main.revisions.clone();

        let top_level = self.build_children(&main.root, &scope, DataCtx::data(true))?;
        let (notifications, data): (Vec<_>, Vec<_>) = top_level
            .into_iter()
            .partition(|node| node.kind == NodeKind::Notification);
        model.children = data;
        model.notifications = notifications;

        for stmt in &main.root.children {
            match stmt.tag.as_str() {
                "rpc" => model.rpcs.push(self.build_node(stmt, NodeKind::Rpc, &scope, DataCtx::operation())?),
                "augment" => model.augmentations.push(self.build_augment(stmt, &scope)?),
                "typedef" => {
                    let name = stmt.attr("name").unwrap_or_default();
                    model.typedefs.push(self.build_typedef(stmt, scope.clone().deeper(name)?)?);
                }
                "identity" => model.identities.push(self.build_identity(stmt, &scope)?),
                _ => {}
            }
        }

        debug!(
            module = %model.name,
            nodes = model.children.len(),
            rpcs = model.rpcs.len(),
            notifications = model.notifications.len(),
            augments = model.augmentations.len(),
            "module resolved"
        );
        Ok(model)
    }

    /// Build the data definitions under `parent`, expanding `uses`. `scope`
    /// already includes `parent`.
    fn build_children(
        &self,
        parent: &'a XmlNode,
        scope: &Scope<'a>,
        ctx: DataCtx,
    ) -> Result<Vec<SchemaNode>, LoadError> {
        let mut nodes = Vec::new();
        for stmt in &parent.children {
            if let Some(kind) = data_kind(&stmt.tag) {
                nodes.push(self.build_node(stmt, kind, scope, ctx)?);
            } else if stmt.tag == "uses" {
                nodes.extend(self.expand_uses(stmt, scope, ctx)?);
            }
        }
        Ok(nodes)
    }

    /// Build one schema node. `scope` is the scope enclosing `stmt`.
    fn build_node(
        &self,
        stmt: &'a XmlNode,
        kind: NodeKind,
        scope: &Scope<'a>,
        ctx: DataCtx,
    ) -> Result<SchemaNode, LoadError> {
        let module = scope.module_name();
        let name = match kind {
            NodeKind::Input | NodeKind::Output => kind.keyword(),
            _ => required_attr(stmt, "name", module)?,
        };
        trace!(kind = %kind, name, "building node");
        let own = scope.enter(stmt);

        let mut node = SchemaNode::new(kind, self.node_qname(name));
        node.status = status_of(stmt, module)?;
        node.description = description_of(stmt);
        node.reference = reference_of(stmt);
        node.when = stmt.child_attr("when", "condition").map(str::to_string);
        node.musts = stmt
            .get_children("must")
            .into_iter()
            .map(|must| must_of(must, module))
            .collect::<Result<_, _>>()?;

        let ctx = match kind {
            NodeKind::Rpc | NodeKind::Action | NodeKind::Notification => DataCtx::operation(),
            _ => ctx,
        };
        if let Some(inherited) = ctx.config {
            node.config = Some(match stmt.child_attr("config", "value") {
                Some(raw) => parse_bool(raw, "config", module)?,
                None => inherited,
            });
        }
        if kind.is_mandatory_aware() {
            let mandatory = stmt
                .child_attr("mandatory", "value")
                .map(|raw| parse_bool(raw, "mandatory", module))
                .transpose()?;
            node.mandatory = Some(mandatory.unwrap_or(false));
        }
        if kind.is_element_counted() {
            node.element_count = element_count_of(stmt, module)?;
        }
        if kind.is_typed() {
            let type_stmt = stmt.get_child("type").ok_or_else(|| LoadError::MissingStatement {
                module: module.to_string(),
                statement: format!("type (in {kind} {name})"),
            })?;
            let mut type_def = self.resolve_type(type_stmt, &own)?;
            let defaults: Vec<&str> = stmt
                .get_children("default")
                .into_iter()
                .filter_map(|default| default.attr("value"))
                .collect();
            if !defaults.is_empty() {
                type_def.default_value = Some(defaults.join(", "));
            }
            if let Some(units) = stmt.child_attr("units", "name") {
                type_def.units = Some(units.to_string());
            }
            node.type_def = Some(type_def);
        }

        let inner = DataCtx {
            config: node.config.or(ctx.config),
        };
        node.children = match kind {
            NodeKind::Container
            | NodeKind::List
            | NodeKind::Case
            | NodeKind::Input
            | NodeKind::Output
            | NodeKind::Notification => self.build_children(stmt, &own, inner)?,
            NodeKind::Choice => self.build_cases(stmt, &own, inner)?,
            NodeKind::Rpc | NodeKind::Action => self.build_io(stmt, &own)?,
            NodeKind::Leaf | NodeKind::LeafList | NodeKind::Anydata | NodeKind::Anyxml => Vec::new(),
        };
        Ok(node)
    }

    /// Cases of a choice. A data definition directly under the choice is
    /// wrapped in an implicit case of the same name.
    fn build_cases(
        &self,
        choice: &'a XmlNode,
        scope: &Scope<'a>,
        ctx: DataCtx,
    ) -> Result<Vec<SchemaNode>, LoadError> {
        let mut cases = Vec::new();
        for stmt in &choice.children {
            match data_kind(&stmt.tag) {
                Some(NodeKind::Case) => cases.push(self.build_node(stmt, NodeKind::Case, scope, ctx)?),
                Some(kind) if kind.is_data() => {
                    let short = self.build_node(stmt, kind, scope, ctx)?;
                    let mut case = SchemaNode::new(NodeKind::Case, short.qname.clone());
                    case.config = short.config;
                    case.status = short.status;
                    case.children.push(short);
                    cases.push(case);
                }
                _ => {}
            }
        }
        Ok(cases)
    }

    /// Input and output of an rpc or action. Both are always present.
    fn build_io(&self, operation: &'a XmlNode, scope: &Scope<'a>) -> Result<Vec<SchemaNode>, LoadError> {
        [NodeKind::Input, NodeKind::Output]
            .into_iter()
            .map(|kind| match operation.get_child(kind.keyword()) {
                Some(stmt) => self.build_node(stmt, kind, scope, DataCtx::operation()),
                None => Ok(SchemaNode::new(kind, self.node_qname(kind.keyword()))),
            })
            .collect()
    }

    /// Expand a `uses` into copies of the grouping's nodes, with the uses'
    /// `when` and `refine` statements applied.
    fn expand_uses(
        &self,
        uses: &'a XmlNode,
        scope: &Scope<'a>,
        ctx: DataCtx,
    ) -> Result<Vec<SchemaNode>, LoadError> {
        let module = scope.module_name();
        let name = required_attr(uses, "name", module)?;
        let (grouping, def_scope) = self
            .find_definition("grouping", name, scope)?
            .ok_or_else(|| LoadError::UnresolvedGrouping {
                module: module.to_string(),
                name: name.to_string(),
            })?;
        trace!(grouping = name, "expanding uses");
        let body_scope = def_scope.deeper(name)?.enter(grouping);
        let mut nodes = self.build_children(grouping, &body_scope, ctx)?;

        if let Some(condition) = uses.child_attr("when", "condition") {
            for node in &mut nodes {
                node.when = Some(match node.when.take() {
                    Some(own) => format!("({own}) and ({condition})"),
                    None => condition.to_string(),
                });
            }
        }
        for refine in uses.get_children("refine") {
            apply_refine(&mut nodes, refine, module)?;
        }
        Ok(nodes)
    }

    fn build_augment(&self, stmt: &'a XmlNode, scope: &Scope<'a>) -> Result<Augmentation, LoadError> {
        let module = scope.module_name();
        let raw_target = required_attr(stmt, "target-node", module)?;
        let mut target = SchemaPath::root();
        for step in raw_target.split('/').filter(|step| !step.is_empty()) {
            let (prefix, local) = split_prefixed(step);
            let owner = match prefix {
                Some(prefix) => &self.module_for_prefix(scope.source, prefix)?.name,
                None => &scope.source.name,
            };
            target = target.child(PathSegment::new(owner.clone(), local));
        }

        let in_operation = target
            .local_names()
            .any(|local| local == "input" || local == "output");
        let ctx = if in_operation {
            DataCtx::operation()
        } else {
            DataCtx::data(true)
        };
        let children = self.build_children(stmt, &scope.enter(stmt), ctx)?;

        Ok(Augmentation {
            target,
            when: stmt.child_attr("when", "condition").map(str::to_string),
            status: status_of(stmt, module)?,
            children,
        })
    }

    fn build_identity(&self, stmt: &'a XmlNode, scope: &Scope<'a>) -> Result<Identity, LoadError> {
        let module = scope.module_name();
        let name = required_attr(stmt, "name", module)?;
        let mut identity = Identity::new(self.node_qname(name));
        identity.bases = stmt
            .get_children("base")
            .into_iter()
            .map(|base| self.qualify(required_attr(base, "name", module)?, scope))
            .collect::<Result<_, _>>()?;
        identity.status = status_of(stmt, module)?;
        identity.description = description_of(stmt);
        identity.reference = reference_of(stmt);
        Ok(identity)
    }
}

fn must_of(stmt: &XmlNode, module: &str) -> Result<MustConstraint, LoadError> {
    let mut must = MustConstraint::new(required_attr(stmt, "condition", module)?);
    must.error_message = stmt.child_text("error-message", "value").map(str::to_string);
    must.error_app_tag = stmt.child_attr("error-app-tag", "value").map(str::to_string);
    must.description = description_of(stmt);
    must.reference = reference_of(stmt);
    Ok(must)
}

fn element_count_of(stmt: &XmlNode, module: &str) -> Result<Option<ElementCountConstraint>, LoadError> {
    let min_stmt = stmt.child_attr("min-elements", "value");
    let max_stmt = stmt.child_attr("max-elements", "value");
    if min_stmt.is_none() && max_stmt.is_none() {
        return Ok(None);
    }
    let min = min_stmt
        .map(|raw| raw.trim().parse::<u32>().map_err(|_| invalid(module, "min-elements", raw)))
        .transpose()?;
    let max = match max_stmt.map(str::trim) {
        None | Some("unbounded") => None,
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| invalid(module, "max-elements", raw))?),
    };
    Ok(Some(ElementCountConstraint { min, max }))
}

/// Apply a `refine` to the nodes a `uses` produced.
fn apply_refine(nodes: &mut [SchemaNode], refine: &XmlNode, module: &str) -> Result<(), LoadError> {
    let target = required_attr(refine, "target-node", module)?;
    let steps: Vec<&str> = target
        .split('/')
        .filter(|step| !step.is_empty())
        .map(|step| split_prefixed(step).1)
        .collect();
    let node = find_node_mut(nodes, &steps).ok_or_else(|| invalid(module, "refine target", target))?;

    if let Some(text) = description_of(refine) {
        node.description = Some(text);
    }
    if let Some(text) = reference_of(refine) {
        node.reference = Some(text);
    }
    if let Some(raw) = refine.child_attr("config", "value") {
        let config = parse_bool(raw, "config", module)?;
        node.config = Some(config);
        if !config {
            clear_config(&mut node.children);
        }
    }
    if let Some(raw) = refine.child_attr("mandatory", "value") {
        node.mandatory = Some(parse_bool(raw, "mandatory", module)?);
    }
    if refine.get_child("min-elements").is_some() || refine.get_child("max-elements").is_some() {
        let refined = element_count_of(refine, module)?.unwrap_or_default();
        let count = node.element_count.get_or_insert_with(Default::default);
        if refine.get_child("min-elements").is_some() {
            count.min = refined.min;
        }
        if refine.get_child("max-elements").is_some() {
            count.max = refined.max;
        }
    }
    let defaults: Vec<&str> = refine
        .get_children("default")
        .into_iter()
        .filter_map(|default| default.attr("value"))
        .collect();
    if !defaults.is_empty() {
        if let Some(type_def) = node.type_def.as_mut() {
            type_def.default_value = Some(defaults.join(", "));
        }
    }
    for must in refine.get_children("must") {
        node.musts.push(must_of(must, module)?);
    }
    Ok(())
}

fn find_node_mut<'n>(nodes: &'n mut [SchemaNode], steps: &[&str]) -> Option<&'n mut SchemaNode> {
    let (first, rest) = steps.split_first()?;
    let node = nodes.iter_mut().find(|node| node.local_name() == *first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        find_node_mut(&mut node.children, rest)
    }
}

/// Descendants of a node refined to `config false` are state data too.
fn clear_config(nodes: &mut [SchemaNode]) {
    for node in nodes {
        if node.config.is_some() {
            node.config = Some(false);
        }
        clear_config(&mut node.children);
    }
}
