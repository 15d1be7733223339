/// 资源树模块
///
/// 资源文件在内存中表示为节点树：每个节点拥有按名称索引的属性，
/// 以及按名称分组、保持顺序的子节点列表。节点以 `Rc<RefCell<_>>` 共享，
/// 条目通过弱引用指向树中的节点，树本身由 `LocaleFile` 独占。
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use serde::{Serialize, Deserialize};

use crate::datatypes::NodeAttribute;
use crate::utils::{LocaleError, Result};

/// 共享节点引用
pub type NodeRef = Rc<RefCell<Node>>;
/// 非拥有节点引用
pub type WeakNodeRef = Weak<RefCell<Node>>;

/// 默认本地化资源模板（编译期嵌入）
const DEFAULT_LOCALE_RESOURCE: &str = include_str!("../data/default_locale_resource.json");

/// 资源节点
#[derive(Debug)]
pub struct Node {
    /// 节点名称（资源格式中的 id）
    pub name: String,
    /// 属性表
    pub attributes: BTreeMap<String, NodeAttribute>,
    /// 子节点分组（保持插入顺序）
    pub children: Vec<ChildGroup>,
    /// 父节点
    parent: Option<WeakNodeRef>,
}

/// 同名子节点分组
#[derive(Debug, Clone)]
pub struct ChildGroup {
    pub name: String,
    pub nodes: Vec<NodeRef>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// 创建共享节点
    pub fn new_ref(name: impl Into<String>) -> NodeRef {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn attribute(&self, name: &str) -> Option<&NodeAttribute> {
        self.attributes.get(name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut NodeAttribute> {
        self.attributes.get_mut(name)
    }

    /// 设置属性，返回被替换的旧属性
    pub fn set_attribute(&mut self, name: impl Into<String>, attribute: NodeAttribute) -> Option<NodeAttribute> {
        self.attributes.insert(name.into(), attribute)
    }

    /// 第一个持有可翻译字符串的属性名（按属性名顺序）
    pub fn translated_string_attribute(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(_, attribute)| attribute.is_translated_string())
            .map(|(name, _)| name.as_str())
    }

    pub fn has_translated_string(&self) -> bool {
        self.translated_string_attribute().is_some()
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// 子节点总数（所有分组）
    pub fn child_count(&self) -> usize {
        self.children.iter().map(|group| group.nodes.len()).sum()
    }

    pub fn group(&self, name: &str) -> Option<&ChildGroup> {
        self.children.iter().find(|group| group.name == name)
    }

    /// 查找子节点所在分组的名称
    pub fn group_of(&self, child: &NodeRef) -> Option<&str> {
        self.children
            .iter()
            .find(|group| group.nodes.iter().any(|node| Rc::ptr_eq(node, child)))
            .map(|group| group.name.as_str())
    }

    /// 追加子节点并设置其父节点
    ///
    /// 分组不存在时在末尾新建。
    pub fn append_child(parent: &NodeRef, group_name: &str, child: NodeRef) {
        child.borrow_mut().parent = Some(Rc::downgrade(parent));

        let mut parent = parent.borrow_mut();
        match parent.children.iter_mut().find(|group| group.name == group_name) {
            Some(group) => group.nodes.push(child),
            None => parent.children.push(ChildGroup {
                name: group_name.to_string(),
                nodes: vec![child],
            }),
        }
    }

    /// 从父节点中移除子节点
    pub fn remove_child(parent: &NodeRef, child: &NodeRef) -> bool {
        let mut parent = parent.borrow_mut();
        let mut removed = false;
        for group in parent.children.iter_mut() {
            let before = group.nodes.len();
            group.nodes.retain(|node| !Rc::ptr_eq(node, child));
            removed |= group.nodes.len() != before;
        }
        parent.children.retain(|group| !group.nodes.is_empty());
        if removed {
            child.borrow_mut().parent = None;
        }
        removed
    }
}

/// 资源版本信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
    pub build: u32,
}

/// 资源区域
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub node: NodeRef,
}

/// 资源
#[derive(Debug, Default)]
pub struct Resource {
    pub metadata: ResourceMetadata,
    pub regions: Vec<Region>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加区域，返回区域根节点
    pub fn add_region(&mut self, name: impl Into<String>, root_name: impl Into<String>) -> NodeRef {
        let node = Node::new_ref(root_name);
        self.regions.push(Region {
            name: name.into(),
            node: node.clone(),
        });
        node
    }

    /// 第一个区域的根节点
    pub fn first_region(&self) -> Option<&NodeRef> {
        self.regions.first().map(|region| &region.node)
    }

    /// 从可序列化表示构建节点树
    pub fn from_data(data: ResourceData) -> Self {
        let regions = data
            .regions
            .into_iter()
            .map(|region| Region {
                name: region.id,
                node: build_node(region.node),
            })
            .collect();

        Self {
            metadata: data.metadata,
            regions,
        }
    }

    /// 转换为可序列化表示
    pub fn to_data(&self) -> ResourceData {
        ResourceData {
            metadata: self.metadata,
            regions: self
                .regions
                .iter()
                .map(|region| RegionData {
                    id: region.name.clone(),
                    node: snapshot_node(&region.node),
                })
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: ResourceData = serde_json::from_str(json)?;
        Ok(Self::from_data(data))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_data())?)
    }

    /// 创建默认本地化资源（单个 TranslatedStringKey 节点）
    pub fn default_locale_resource() -> Result<Self> {
        let data: ResourceData = serde_json::from_str(DEFAULT_LOCALE_RESOURCE)
            .map_err(|e| LocaleError::Template(e.to_string()))?;
        Ok(Self::from_data(data))
    }
}

/// 资源的可序列化表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    pub metadata: ResourceMetadata,
    pub regions: Vec<RegionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionData {
    pub id: String,
    pub node: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, NodeAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildGroupData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildGroupData {
    pub name: String,
    pub nodes: Vec<NodeData>,
}

fn build_node(data: NodeData) -> NodeRef {
    let node = Node::new_ref(data.id);
    node.borrow_mut().attributes = data.attributes;

    for group in data.children {
        for child in group.nodes {
            let child = build_node(child);
            Node::append_child(&node, &group.name, child);
        }
    }

    node
}

fn snapshot_node(node: &NodeRef) -> NodeData {
    let node = node.borrow();
    NodeData {
        id: node.name.clone(),
        attributes: node.attributes.clone(),
        children: node
            .children
            .iter()
            .map(|group| ChildGroupData {
                name: group.name.clone(),
                nodes: group.nodes.iter().map(snapshot_node).collect(),
            })
            .collect(),
    }
}
