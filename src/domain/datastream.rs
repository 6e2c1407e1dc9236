// ==========================================
// P21 业务规则 - 表单数据流 (XML Datastream)
// ==========================================
// 职责: 发票等表单生成的 XML 文档；表单/表头/行/明细组 层级
// 工具: quick-xml 解析与序列化
// ==========================================
// 结构: <根> → FORM* → HEADER / LINE（LINE 可嵌套在任意容器内）
// 保留: 注释、处理指令、DOCTYPE 随保存原样写回
// ==========================================

use crate::domain::error::DatastreamError;
use crate::domain::types::SortOrder;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ==========================================
// Element - 轻量 XML 元素树
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// 原样保留，回写时不转义
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 带文本内容的叶子元素；None 生成空元素
    pub fn with_text(name: &str, text: Option<&str>) -> Self {
        let mut element = Self::new(name);
        if let Some(text) = text {
            element.set_text(text);
        }
        element
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// 所有后代文本拼接
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// 用单一文本节点替换全部子节点
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// 第一个同名直接子元素
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|e| e.name == name)
    }

    /// 直接子元素的文本值
    pub fn element_value(&self, name: &str) -> Option<String> {
        self.element(name).map(Element::text)
    }

    /// 深度优先收集同名后代（不进入已命中的元素）
    fn descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == name {
                out.push(child);
            } else {
                child.descendants(name, out);
            }
        }
    }

    fn descendants_mut<'a>(&'a mut self, name: &str, out: &mut Vec<&'a mut Element>) {
        for child in self.child_elements_mut() {
            if child.name == name {
                out.push(child);
            } else {
                child.descendants_mut(name, out);
            }
        }
    }

    /// 递归对每个直接包含目标行的父元素执行稳定排序
    fn sort_children_by(&mut self, line_tag: &str, key: &str, numeric: bool, order: SortOrder) {
        if self.child_elements().any(|e| e.name == line_tag) {
            sort_line_slots(&mut self.children, line_tag, key, numeric, order);
        }
        for child in self.child_elements_mut() {
            if child.name != line_tag {
                child.sort_children_by(line_tag, key, numeric, order);
            }
        }
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

/// 仅重排目标行占据的位置，其他兄弟节点保持原位
fn sort_line_slots(children: &mut [Node], line_tag: &str, key: &str, numeric: bool, order: SortOrder) {
    let slots: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, n)| matches!(n, Node::Element(e) if e.name == line_tag))
        .map(|(i, _)| i)
        .collect();

    let mut lines: Vec<Node> = slots
        .iter()
        .map(|&i| std::mem::replace(&mut children[i], Node::Text(String::new())))
        .collect();

    lines.sort_by(|a, b| {
        let ka = sort_key(a, key);
        let kb = sort_key(b, key);
        let ord = compare_keys(&ka, &kb, numeric);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    for (slot, line) in slots.into_iter().zip(lines) {
        children[slot] = line;
    }
}

fn sort_key(node: &Node, key: &str) -> String {
    match node {
        Node::Element(e) => e.element_value(key).unwrap_or_default(),
        _ => String::new(),
    }
}

/// 数值排序时，非数值键排在数值键之后并按字面比较
fn compare_keys(a: &str, b: &str, numeric: bool) -> Ordering {
    if !numeric {
        return a.cmp(b);
    }
    match (Decimal::from_str(a.trim()), Decimal::from_str(b.trim())) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

// ==========================================
// DatastreamLayout - 层级标签名
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastreamLayout {
    pub form_tag: String,
    pub header_tag: String,
    pub line_tag: String,
}

impl Default for DatastreamLayout {
    fn default() -> Self {
        Self {
            form_tag: "FORM".to_string(),
            header_tag: "HEADER".to_string(),
            line_tag: "LINE".to_string(),
        }
    }
}

/// 表头/行在文档中的定位（表单序号 + 表单内序号）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub form: usize,
    pub index: usize,
}

// ==========================================
// XmlDatastream
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDatastream {
    /// 根元素前后的注释/处理指令/DOCTYPE
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
    layout: DatastreamLayout,
    file_path: Option<PathBuf>,
}

impl XmlDatastream {
    pub fn new(root: Element, layout: DatastreamLayout) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
            layout,
            file_path: None,
        }
    }

    /// 从字符串解析
    pub fn parse(xml: &str, layout: DatastreamLayout) -> Result<Self, DatastreamError> {
        let document = parse_document(xml)?;
        Ok(Self {
            prolog: document.prolog,
            epilog: document.epilog,
            ..Self::new(document.root, layout)
        })
    }

    /// 从文件加载，并记住来源路径以便回写
    pub fn load<P: AsRef<Path>>(path: P, layout: DatastreamLayout) -> Result<Self, DatastreamError> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let mut stream = Self::parse(&xml, layout)?;
        stream.file_path = Some(path.to_path_buf());
        Ok(stream)
    }

    pub fn with_file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn layout(&self) -> &DatastreamLayout {
        &self.layout
    }

    // ===== 表单 =====

    pub fn forms(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        if self.root.name == self.layout.form_tag {
            out.push(&self.root);
        } else {
            self.root.descendants(&self.layout.form_tag, &mut out);
        }
        out
    }

    fn forms_mut(&mut self) -> Vec<&mut Element> {
        let mut out = Vec::new();
        if self.root.name == self.layout.form_tag {
            out.push(&mut self.root);
        } else {
            let tag = self.layout.form_tag.clone();
            self.root.descendants_mut(&tag, &mut out);
        }
        out
    }

    pub fn form_count(&self) -> usize {
        self.forms().len()
    }

    // ===== 表头 =====

    /// 全部表头（跨表单）
    pub fn headers(&self) -> Vec<NodeRef> {
        self.collect_refs(&self.layout.header_tag)
    }

    /// 指定表单的第一个表头
    pub fn header_of(&self, form: usize) -> Option<NodeRef> {
        self.headers().into_iter().find(|r| r.form == form)
    }

    // ===== 行 =====

    pub fn lines(&self) -> Vec<NodeRef> {
        self.collect_refs(&self.layout.line_tag)
    }

    pub fn lines_of(&self, form: usize) -> Vec<NodeRef> {
        self.lines().into_iter().filter(|r| r.form == form).collect()
    }

    fn collect_refs(&self, tag: &str) -> Vec<NodeRef> {
        self.forms()
            .iter()
            .enumerate()
            .flat_map(|(form, element)| {
                let mut found = Vec::new();
                element.descendants(tag, &mut found);
                (0..found.len()).map(move |index| NodeRef { form, index })
            })
            .collect()
    }

    fn resolve(&self, tag: &str, node: NodeRef) -> Result<&Element, DatastreamError> {
        let forms = self.forms();
        let form = forms
            .get(node.form)
            .ok_or_else(|| DatastreamError::MissingElement(self.layout.form_tag.clone()))?;
        let mut found = Vec::new();
        form.descendants(tag, &mut found);
        found
            .get(node.index)
            .copied()
            .ok_or_else(|| DatastreamError::MissingElement(tag.to_string()))
    }

    fn resolve_mut(&mut self, tag: &str, node: NodeRef) -> Result<&mut Element, DatastreamError> {
        let form_tag = self.layout.form_tag.clone();
        let mut forms = self.forms_mut();
        if node.form >= forms.len() {
            return Err(DatastreamError::MissingElement(form_tag));
        }
        let form = forms.swap_remove(node.form);
        let mut found = Vec::new();
        form.descendants_mut(tag, &mut found);
        if node.index >= found.len() {
            return Err(DatastreamError::MissingElement(tag.to_string()));
        }
        Ok(found.swap_remove(node.index))
    }

    pub fn header(&self, node: NodeRef) -> Result<&Element, DatastreamError> {
        let tag = self.layout.header_tag.clone();
        self.resolve(&tag, node)
    }

    pub fn header_mut(&mut self, node: NodeRef) -> Result<&mut Element, DatastreamError> {
        let tag = self.layout.header_tag.clone();
        self.resolve_mut(&tag, node)
    }

    pub fn line(&self, node: NodeRef) -> Result<&Element, DatastreamError> {
        let tag = self.layout.line_tag.clone();
        self.resolve(&tag, node)
    }

    pub fn line_mut(&mut self, node: NodeRef) -> Result<&mut Element, DatastreamError> {
        let tag = self.layout.line_tag.clone();
        self.resolve_mut(&tag, node)
    }

    // ===== 明细组 =====

    /// 父元素下指定名称的明细组
    pub fn groups<'a>(parent: &'a Element, group_name: &str) -> Vec<&'a Element> {
        parent.child_elements().filter(|e| e.name == group_name).collect()
    }

    pub fn groups_mut<'a>(parent: &'a mut Element, group_name: &str) -> Vec<&'a mut Element> {
        parent
            .child_elements_mut()
            .filter(|e| e.name == group_name)
            .collect()
    }

    /// 在表头或行下追加明细组
    pub fn add_group(parent: &mut Element, group: Element) {
        parent.push_child(group);
    }

    // ===== 排序 =====

    /// 按行内某元素排序全部行（在各自父节点内稳定排序）
    pub fn sort_lines(&mut self, key: &str, numeric: bool, order: SortOrder) {
        let line_tag = self.layout.line_tag.clone();
        for form in self.forms_mut() {
            form.sort_children_by(&line_tag, key, numeric, order);
        }
    }

    /// 只排序指定表单内的行
    pub fn sort_lines_of(
        &mut self,
        form: usize,
        key: &str,
        numeric: bool,
        order: SortOrder,
    ) -> Result<(), DatastreamError> {
        let line_tag = self.layout.line_tag.clone();
        let form_tag = self.layout.form_tag.clone();
        let mut forms = self.forms_mut();
        if form >= forms.len() {
            return Err(DatastreamError::MissingElement(form_tag));
        }
        forms
            .swap_remove(form)
            .sort_children_by(&line_tag, key, numeric, order);
        Ok(())
    }

    // ===== 序列化 =====

    pub fn to_xml_string(&self) -> Result<String, DatastreamError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| DatastreamError::Write(e.to_string()))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| DatastreamError::Write(e.to_string()))
    }

    /// 写回来源文件
    pub fn save(&self) -> Result<(), DatastreamError> {
        let path = self.file_path.as_ref().ok_or(DatastreamError::NoFilePath)?;
        self.save_to(path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DatastreamError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path.as_ref(), xml)?;
        tracing::debug!(path = %path.as_ref().display(), "datastream saved");
        Ok(())
    }
}

// ==========================================
// quick-xml 读写
// ==========================================

struct ParsedDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

fn parse_document(xml: &str) -> Result<ParsedDocument, DatastreamError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut prolog: Vec<Node> = Vec::new();
    let mut epilog: Vec<Node> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DatastreamError::Parse(e.to_string()))?;
        match event {
            Event::Start(start) => {
                stack.push(start_element(&start)?);
            }
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DatastreamError::Parse("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| DatastreamError::Parse(e.to_string()))?;
                if !text.trim().is_empty() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Comment(comment) => {
                let node = Node::Comment(String::from_utf8_lossy(&comment).into_owned());
                attach_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
            }
            Event::PI(pi) => {
                let node = Node::ProcessingInstruction(String::from_utf8_lossy(&pi).into_owned());
                attach_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
            }
            Event::DocType(doctype) => {
                let node = Node::DocType(String::from_utf8_lossy(&doctype).trim().to_string());
                attach_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
            }
            Event::Eof => break,
            // XML 声明由序列化时重新写出
            Event::Decl(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(DatastreamError::Parse("unexpected end of document".to_string()));
    }
    let root = root.ok_or_else(|| DatastreamError::Parse("document has no root element".to_string()))?;
    Ok(ParsedDocument { prolog, root, epilog })
}

/// 非元素节点挂到当前父元素；根元素之外的按位置归入 prolog / epilog
fn attach_misc(
    stack: &mut [Element],
    root: &Option<Element>,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
    node: Node,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}

fn start_element(start: &BytesStart<'_>) -> Result<Element, DatastreamError> {
    let mut element = Element::new(&String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DatastreamError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DatastreamError::Parse(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DatastreamError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(DatastreamError::Parse("multiple root elements".to_string())),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), DatastreamError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| DatastreamError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| DatastreamError::Write(e.to_string()))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| DatastreamError::Write(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), DatastreamError> {
    let event = match node {
        Node::Element(e) => return write_element(writer, e),
        Node::Text(t) => Event::Text(BytesText::new(t)),
        Node::Comment(c) => Event::Comment(BytesText::from_escaped(c.as_str())),
        Node::ProcessingInstruction(p) => Event::PI(BytesPI::new(p.as_str())),
        Node::DocType(d) => Event::DocType(BytesText::from_escaped(d.as_str())),
    };
    writer
        .write_event(event)
        .map_err(|e| DatastreamError::Write(e.to_string()))
}
