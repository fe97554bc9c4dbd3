// Session-scoped object references for uploaded contents. A URL stays valid
// until it is revoked or the process exits.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use crate::ids::IdGenerator;
use crate::records::FileHandle;

const URL_PREFIX: &str = "blob:breezy/";

#[derive(Default)]
pub struct ObjectUrls {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl ObjectUrls {
    pub fn new() -> ObjectUrls {
        ObjectUrls::default()
    }

    pub fn allocate(&self, ids: &dyn IdGenerator, handle: &FileHandle) -> String {
        let url = format!("{}{}", URL_PREFIX, ids.next_id());
        let mut objects = self.objects.lock().unwrap();
        objects.insert(url.clone(), handle.contents.clone());
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        let objects = self.objects.lock().unwrap();
        objects.get(url).cloned()
    }

    pub fn revoke(&self, url: &str) -> bool {
        let mut objects = self.objects.lock().unwrap();
        objects.remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use chrono::Utc;

    #[test]
    fn revoked_urls_no_longer_resolve() {
        let urls = ObjectUrls::new();
        let ids = SequentialIds::new("obj");
        let handle = FileHandle::new("a.txt", "text/plain", Utc::now(), Bytes::from_static(b"hello"));
        let url = urls.allocate(&ids, &handle);
        assert_eq!(url, "blob:breezy/obj-1");
        assert_eq!(urls.resolve(&url), Some(Bytes::from_static(b"hello")));
        assert!(urls.revoke(&url));
        assert_eq!(urls.resolve(&url), None);
        assert!(!urls.revoke(&url));
        assert_eq!(urls.len(), 0);
    }
}
