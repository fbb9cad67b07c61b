//! Built-in signatures of core JDK classes
//!
//! Every project sees these as compiled classes, so `super.toString()` in a
//! class without an explicit superclass still resolves to a declaration.

use std::path::PathBuf;

/// Path under which built-in units are registered
pub const BUILTIN_ROOT: &str = "<jdk>";

const OBJECT: &str = r#"package java.lang;

public class Object {
    public Object() {}

    public final native Class<?> getClass();

    public native int hashCode();

    public boolean equals(Object obj) {
        return (this == obj);
    }

    protected native Object clone() throws CloneNotSupportedException;

    public String toString() {
        return getClass().getName() + "@" + Integer.toHexString(hashCode());
    }

    public final native void notify();

    public final native void notifyAll();

    public final void wait() throws InterruptedException {
        wait(0L);
    }

    public final native void wait(long timeoutMillis) throws InterruptedException;

    @Deprecated(since="9")
    protected void finalize() throws Throwable { }
}
"#;

/// `(path, contents)` of every built-in compiled unit
pub fn builtin_units() -> Vec<(PathBuf, &'static str)> {
    vec![(PathBuf::from(BUILTIN_ROOT).join("java/lang/Object.java"), OBJECT)]
}
