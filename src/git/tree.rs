use git2::{ErrorCode, ObjectType};

use crate::error::Result;
use crate::git::repository::GitRepository;
use crate::models::ExtractedFile;

impl GitRepository {
    /// Every blob in the HEAD tree. An unborn HEAD has no files.
    pub fn head_files(&self) -> Result<Vec<ExtractedFile>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let tree = head.peel_to_tree()?;

        fn collect(
            repo: &git2::Repository,
            tree: &git2::Tree,
            base_path: &str,
            files: &mut Vec<ExtractedFile>,
        ) -> Result<()> {
            for entry in tree.iter() {
                let name = String::from_utf8_lossy(entry.name_bytes()).to_string();
                let path = if base_path.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", base_path, name)
                };

                match entry.kind() {
                    Some(ObjectType::Blob) => {
                        let blob = repo.find_blob(entry.id())?;
                        files.push(ExtractedFile {
                            name,
                            size: blob.size() as u64,
                            path,
                        });
                    }
                    Some(ObjectType::Tree) => {
                        let subtree = repo.find_tree(entry.id())?;
                        collect(repo, &subtree, &path, files)?;
                    }
                    // Submodules are commits in another repository.
                    _ => {}
                }
            }
            Ok(())
        }

        let mut files = Vec::new();
        collect(&self.repo, &tree, "", &mut files)?;
        Ok(files)
    }
}
