use crate::error::RigError;
use crate::types::*;
use cgmath::{Decomposed, One};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub type BoneTransform = Decomposed<Position, Quaternion>;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Hierarchy of named bones. A bone's parent always has a smaller index than the bone itself.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, Index>,
}

/// On-disk rig description: bones in parent-first order.
#[derive(Debug, Deserialize)]
struct RigDef {
    bones: Vec<BoneDef>,
}

#[derive(Debug, Deserialize)]
struct BoneDef {
    name: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    offset: [f64; 3],
}

impl Skeleton {
    pub fn new() -> Self {
        Skeleton::default()
    }

    /// Append a bone under `parent` with rest offset `offset` and identity rotation.
    pub fn add_bone(
        &mut self,
        name: &str,
        parent: Option<Index>,
        offset: Position,
    ) -> Result<Index, RigError> {
        if self.by_name.contains_key(name) {
            return Err(RigError::DuplicateBone {
                name: name.to_string(),
            });
        }
        if let Some(parent) = parent {
            if parent >= self.bones.len() {
                return Err(RigError::ParentOutOfRange {
                    name: name.to_string(),
                    parent,
                });
            }
        }

        let index = self.bones.len();
        //// register with the parent so children stay in insertion order
        if let Some(parent) = parent {
            self.bones[parent].children.push(index);
        }
        self.bones.push(Bone {
            name: name.to_string(),
            index,
            parent,
            children: Vec::new(),
            local_position: offset,
            local_rotation: Quaternion::one(),
        });
        self.by_name.insert(name.to_string(), index);
        Ok(index)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bone(&self, index: Index) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bone_mut(&mut self, index: Index) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    pub fn find_bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.by_name.get(name).map(|&i| &self.bones[i])
    }

    pub fn find_bone_index(&self, name: &str) -> Option<Index> {
        self.by_name.get(name).copied()
    }

    /// Transform of a bone relative to its parent.
    pub fn local_transform(&self, index: Index) -> BoneTransform {
        let bone = &self.bones[index];
        Decomposed {
            scale: 1.0,
            rot: bone.local_rotation,
            disp: bone.local_position,
        }
    }

    /// Transform of a bone in skeleton space: its ancestors' local transforms composed root first.
    pub fn world_transform(&self, index: Index) -> BoneTransform {
        let mut transform = self.local_transform(index);
        let mut parent = self.bones[index].parent;
        while let Some(p) = parent {
            transform = self.local_transform(p) * transform;
            parent = self.bones[p].parent;
        }
        transform
    }

    /// World transforms of every bone, computed in one parent-first pass.
    pub fn world_transforms(&self) -> Vec<BoneTransform> {
        let mut world: Vec<BoneTransform> = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let local = self.local_transform(bone.index);
            let transform = match bone.parent {
                Some(p) => world[p] * local,
                None => local,
            };
            world.push(transform);
        }
        world
    }

    pub fn depth(&self, index: Index) -> usize {
        let mut depth = 0;
        let mut parent = self.bones[index].parent;
        while let Some(p) = parent {
            depth += 1;
            parent = self.bones[p].parent;
        }
        depth
    }

    /// Bone names indented by depth, for diagnostic listings.
    pub fn bone_names(&self) -> Vec<String> {
        self.bones
            .iter()
            .map(|bone| format!("{}{}", "  ".repeat(self.depth(bone.index)), bone.name))
            .collect()
    }

    /// Build a skeleton from a JSON rig description.
    pub fn from_rig_str(text: &str) -> Result<Self, RigError> {
        let def: RigDef = serde_json::from_str(text)?;
        let mut skeleton = Skeleton::new();
        for bone in def.bones {
            let parent = match bone.parent {
                Some(parent) => Some(skeleton.find_bone_index(&parent).ok_or_else(|| {
                    RigError::UnknownParent {
                        name: bone.name.clone(),
                        parent,
                    }
                })?),
                None => None,
            };
            let [x, y, z] = bone.offset;
            skeleton.add_bone(&bone.name, parent, Position::new(x, y, z))?;
        }
        Ok(skeleton)
    }

    pub fn from_rig_file(path: impl AsRef<Path>) -> Result<Self, RigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Skeleton::from_rig_str(&text)
    }
}
