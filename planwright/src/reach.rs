//! Entry selection and the door-graph reachability check. The graph is
//! undirected: vertices are placed rooms, edges are interior doors.
//! Windows never count as circulation.

use petgraph::{graph::NodeIndex, visit::Bfs, Graph, Undirected};

use crate::{
    frame::Frame,
    intent::NormalizedIntent,
    plan::PlanState,
};

/// Where visitors come in. First match wins: the room flagged with an
/// exterior door, then a foyer, then circulation on the front edge, then
/// anything on the front edge.
pub fn select_entry(state: &PlanState, intent: &NormalizedIntent, frame: &Frame) -> Option<String> {
    let flagged = state
        .rooms()
        .find(|r| intent.room(&r.id).is_some_and(|s| s.has_exterior_door));
    if let Some(room) = flagged {
        return Some(room.id.clone());
    }

    if let Some(foyer) = state.rooms().find(|r| r.kind == crate::intent::RoomType::Foyer) {
        return Some(foyer.id.clone());
    }

    // Generated rooms have no spec; their type decides circulation.
    let is_circulation = |id: &str, kind: crate::intent::RoomType| {
        intent
            .room(id)
            .map_or(kind.category() == crate::intent::RoomCategory::Circulation, |s| {
                s.is_circulation()
            })
    };
    let on_front = |rect: &crate::geom::Rect| frame.footprint.touches_edge(rect, frame.front_edge);
    if let Some(room) = state
        .rooms()
        .find(|r| is_circulation(&r.id, r.kind) && on_front(&r.rect))
    {
        return Some(room.id.clone());
    }

    state.rooms().find(|r| on_front(&r.rect)).map(|r| r.id.clone())
}

/// The undirected door graph over placed rooms. Node order follows
/// placement order, edge order follows opening order.
pub fn door_graph(state: &PlanState) -> (Graph<String, (), Undirected>, Vec<NodeIndex>) {
    let mut graph = Graph::new_undirected();
    let nodes: Vec<NodeIndex> = state.placed.keys().map(|id| graph.add_node(id.clone())).collect();

    let index_of = |id: &str| state.placed.get_index_of(id);
    for opening in state.interior_doors() {
        let (Some(a), Some(b)) = (
            index_of(&opening.room_id),
            opening.connects_to.as_deref().and_then(index_of),
        ) else {
            continue;
        };
        graph.add_edge(nodes[a], nodes[b], ());
    }
    (graph, nodes)
}

#[derive(Debug, Clone)]
pub struct ReachReport {
    pub entry: Option<String>,
    pub reachable: Vec<String>,
    pub unreachable: Vec<String>,
}

/// BFS over the door graph from the entry. Rooms the search never saw
/// come back in placement order so error output is stable.
pub fn check_reachability(state: &PlanState, intent: &NormalizedIntent, frame: &Frame) -> ReachReport {
    let entry = select_entry(state, intent, frame);
    let (graph, nodes) = door_graph(state);

    let mut visited = vec![false; nodes.len()];
    if let Some(entry_id) = entry.as_deref() {
        if let Some(start) = state.placed.get_index_of(entry_id) {
            let mut bfs = Bfs::new(&graph, nodes[start]);
            while let Some(node) = bfs.next(&graph) {
                visited[node.index()] = true;
            }
        }
    }

    let mut reachable = Vec::new();
    let mut unreachable = Vec::new();
    for (idx, id) in state.placed.keys().enumerate() {
        if visited[idx] {
            reachable.push(id.clone());
        } else {
            unreachable.push(id.clone());
        }
    }

    ReachReport {
        entry,
        reachable,
        unreachable,
    }
}
